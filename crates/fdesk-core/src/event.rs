#![forbid(unsafe_code)]

//! Canonical input events.
//!
//! Widgets never talk to a terminal backend directly. The host loop converts
//! backend input into these types and routes them, together with the hit-test
//! result for pointer events, to the widget that should react.
//!
//! # Design Notes
//!
//! - Pointer coordinates are 0-indexed cells, origin at the top-left.
//! - `KeyEventKind` defaults to `Press`; widgets ignore releases.
//! - `Modifiers` are bitflags so chords combine with `|`.

use bitflags::bitflags;

/// Canonical input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A keyboard event.
    Key(KeyEvent),

    /// A pointer event.
    Mouse(MouseEvent),

    /// Text pasted in one piece (bracketed paste).
    Paste(PasteEvent),

    /// The viewport changed size.
    Resize {
        /// New width in columns.
        width: u16,
        /// New height in rows.
        height: u16,
    },

    /// Focus gained (`true`) or lost (`false`).
    Focus(bool),
}

impl Event {
    /// Shorthand for a plain key press.
    #[must_use]
    pub const fn key(code: KeyCode) -> Self {
        Self::Key(KeyEvent::new(code))
    }

    /// Shorthand for a primary-button press at `(x, y)`.
    #[must_use]
    pub const fn click(x: u16, y: u16) -> Self {
        Self::Mouse(MouseEvent::new(MouseEventKind::Down(MouseButton::Left), x, y))
    }

    /// Whether this is a primary-button press, the only pointer event that
    /// changes selection or open/closed state.
    #[must_use]
    pub fn is_primary_down(&self) -> bool {
        matches!(self, Self::Mouse(mouse) if mouse.is_primary_down())
    }
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// Press, repeat, or release.
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a press with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Attach modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Override the event kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Press or auto-repeat; releases are not actionable.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        self.kind != KeyEventKind::Release
    }

    /// The character to insert into a text field, if this key types one.
    ///
    /// Control characters and chords with Ctrl/Alt/Super never type text.
    #[must_use]
    pub fn printable(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(ch)
                if !ch.is_control()
                    && !self
                        .modifiers
                        .intersects(Modifiers::CTRL | Modifiers::ALT | Modifiers::SUPER) =>
            {
                Some(ch)
            }
            _ => None,
        }
    }

    /// Check if Ctrl modifier is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    BackTab,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    /// Function key (F1-F24).
    F(u8),
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Repeat,
    Release,
}

bitflags! {
    /// Modifier keys that can be held during an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const NONE  = 0b0000;
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// A pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    /// Column (0-indexed).
    pub x: u16,
    /// Row (0-indexed).
    pub y: u16,
    pub modifiers: Modifiers,
}

impl MouseEvent {
    #[must_use]
    pub const fn new(kind: MouseEventKind, x: u16, y: u16) -> Self {
        Self {
            kind,
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    #[must_use]
    pub const fn position(&self) -> (u16, u16) {
        (self.x, self.y)
    }

    /// Primary (left) button pressed.
    #[must_use]
    pub fn is_primary_down(&self) -> bool {
        self.kind == MouseEventKind::Down(MouseButton::Left)
    }
}

/// The type of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    Down(MouseButton),
    Up(MouseButton),
    Drag(MouseButton),
    Moved,
    ScrollUp,
    ScrollDown,
}

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Text delivered by bracketed paste.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteEvent {
    pub text: String,
}

impl PasteEvent {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_accepts_plain_and_shifted_chars() {
        assert_eq!(KeyEvent::new(KeyCode::Char('a')).printable(), Some('a'));
        let shifted = KeyEvent::new(KeyCode::Char('A')).with_modifiers(Modifiers::SHIFT);
        assert_eq!(shifted.printable(), Some('A'));
    }

    #[test]
    fn printable_rejects_chords_and_controls() {
        let ctrl = KeyEvent::new(KeyCode::Char('c')).with_modifiers(Modifiers::CTRL);
        assert_eq!(ctrl.printable(), None);
        assert_eq!(KeyEvent::new(KeyCode::Char('\u{7}')).printable(), None);
        assert_eq!(KeyEvent::new(KeyCode::Enter).printable(), None);
    }

    #[test]
    fn release_is_not_actionable() {
        let release = KeyEvent::new(KeyCode::Enter).with_kind(KeyEventKind::Release);
        assert!(!release.is_actionable());
        assert!(KeyEvent::new(KeyCode::Enter).is_actionable());
    }

    #[test]
    fn click_helper_is_primary_down() {
        let event = Event::click(3, 4);
        assert!(event.is_primary_down());
        let Event::Mouse(mouse) = event else {
            panic!("expected mouse event");
        };
        assert_eq!(mouse.position(), (3, 4));
    }

    #[test]
    fn scroll_is_not_primary_down() {
        let scroll = Event::Mouse(MouseEvent::new(MouseEventKind::ScrollDown, 0, 0));
        assert!(!scroll.is_primary_down());
    }

    #[test]
    fn modifiers_default_is_none() {
        assert_eq!(Modifiers::default(), Modifiers::NONE);
    }
}
