#![forbid(unsafe_code)]

//! Cells and styles.

use bitflags::bitflags;

/// Foreground colour palette.
///
/// Kept to the handful of roles the widgets need; hosts map them onto
/// whatever their backend supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    #[default]
    Default,
    Muted,
    Accent,
    Danger,
    Success,
}

bitflags! {
    /// Text attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        const BOLD      = 0b0000_0001;
        const DIM       = 0b0000_0010;
        const ITALIC    = 0b0000_0100;
        const UNDERLINE = 0b0000_1000;
        const REVERSE   = 0b0001_0000;
    }
}

/// A cell style: optional colour plus attributes.
///
/// `fg: None` keeps whatever colour the cell already had, so styles layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Option<Color>,
    pub attrs: StyleFlags,
}

impl Style {
    pub const fn new() -> Self {
        Self {
            fg: None,
            attrs: StyleFlags::empty(),
        }
    }

    #[must_use]
    pub const fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    #[must_use]
    pub fn bold(mut self) -> Self {
        self.attrs |= StyleFlags::BOLD;
        self
    }

    #[must_use]
    pub fn dim(mut self) -> Self {
        self.attrs |= StyleFlags::DIM;
        self
    }

    #[must_use]
    pub fn reverse(mut self) -> Self {
        self.attrs |= StyleFlags::REVERSE;
        self
    }

    #[must_use]
    pub fn underline(mut self) -> Self {
        self.attrs |= StyleFlags::UNDERLINE;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fg.is_none() && self.attrs.is_empty()
    }

    /// Layer `other` on top of `self`.
    #[must_use]
    pub fn patch(self, other: Style) -> Style {
        Style {
            fg: other.fg.or(self.fg),
            attrs: self.attrs | other.attrs,
        }
    }
}

/// What a cell displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellContent {
    #[default]
    Empty,
    Char(char),
    /// Trailing half of a double-width character drawn in the previous cell.
    Continuation,
}

impl CellContent {
    pub fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(c) => Some(*c),
            _ => None,
        }
    }
}

/// One grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    pub content: CellContent,
    pub fg: Color,
    pub attrs: StyleFlags,
}

impl Cell {
    pub const fn from_char(c: char) -> Self {
        Self {
            content: CellContent::Char(c),
            fg: Color::Default,
            attrs: StyleFlags::empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.content, CellContent::Empty)
    }

    /// Apply a style, leaving content untouched.
    pub fn apply_style(&mut self, style: Style) {
        if let Some(fg) = style.fg {
            self.fg = fg;
        }
        self.attrs |= style.attrs;
    }

    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.apply_style(style);
        self
    }
}
