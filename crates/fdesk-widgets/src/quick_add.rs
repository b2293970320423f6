#![forbid(unsafe_code)]

//! Quick-add party dialog.
//!
//! Answers a selector's [`CreationRequest`]: the party name starts out as the
//! query the user had typed, [`QuickAddPartyState::submit`] gates on the
//! minimum fields, and once the host has created the party it calls
//! [`QuickAddPartyState::complete`] with the new id so the selector can pick
//! it up.

use crate::{StatefulWidget, clear_area, draw_border, draw_line};
use fdesk_catalog::records::PartyType;
use fdesk_core::event::{Event, KeyCode, KeyEvent, MouseButton, MouseEventKind};
use fdesk_core::geometry::{Rect, Sides};
use fdesk_core::text_width::{display_width, pop_grapheme};
use fdesk_render::cell::{Color, Style};
use fdesk_render::frame::{Frame, HitData, HitId, HitRegion};
use fdesk_runtime::creation::{CorrelationId, CreationError, CreationRequest};

/// Text field row; hit data is the [`Field`] index.
pub const FIELD: HitRegion = HitRegion::Custom(1);
/// Party type checkbox; hit data is the index into [`PartyType::ALL`].
pub const TYPE: HitRegion = HitRegion::Custom(2);
/// Submit and cancel buttons; hit data is [`SUBMIT`] or [`CANCEL`].
pub const BUTTON: HitRegion = HitRegion::Button;

pub const SUBMIT: HitData = 0;
pub const CANCEL: HitData = 1;

/// Shortest accepted party name, in characters.
pub const MIN_NAME_CHARS: usize = 2;

const MODAL_WIDTH: u16 = 60;
const TYPE_COLUMNS: usize = 3;
const LABEL_WIDTH: u16 = 16;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuickAddError {
    #[error("At least one party type is required")]
    NoPartyType,
    #[error("Party name must be at least {min} characters")]
    NameTooShort { min: usize },
    #[error("Invalid email address")]
    InvalidEmail,
}

/// Focusable parts of the dialog, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field {
    #[default]
    Name,
    ShortName,
    ContactPerson,
    Email,
    Phone,
    Types,
}

impl Field {
    pub const TEXT: [Field; 5] = [
        Self::Name,
        Self::ShortName,
        Self::ContactPerson,
        Self::Email,
        Self::Phone,
    ];

    const ORDER: [Field; 6] = [
        Self::Name,
        Self::ShortName,
        Self::ContactPerson,
        Self::Email,
        Self::Phone,
        Self::Types,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Party Name *",
            Self::ShortName => "Short Name",
            Self::ContactPerson => "Contact Person",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Types => "Party Types *",
        }
    }

    fn index(self) -> usize {
        Self::ORDER.iter().position(|&f| f == self).unwrap_or(0)
    }

    fn step(self, delta: isize) -> Self {
        let len = Self::ORDER.len() as isize;
        let next = (self.index() as isize + delta).rem_euclid(len);
        Self::ORDER[next as usize]
    }
}

/// Party payload for the backend's create call.
///
/// Credit and tax settings start at zero; they are filled in later from the
/// full party form.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NewParty {
    pub name: String,
    pub short_name: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub party_types: Vec<PartyType>,
    pub credit_limit: u64,
    pub credit_days: u32,
    pub tds_rate: f64,
    pub tds_applicable: bool,
}

/// What the host should do after an event.
#[derive(Debug, Clone, PartialEq)]
pub enum QuickAddAction {
    /// Create this party, then call [`QuickAddPartyState::complete`].
    Submit(NewParty),
    /// Close the dialog and call [`QuickAddPartyState::cancel`].
    Cancel,
}

fn looks_like_email(text: &str) -> bool {
    let Some((local, domain)) = text.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !text.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

fn optional(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct QuickAddPartyState {
    id: HitId,
    request: CreationRequest,
    values: [String; 5],
    types: Vec<PartyType>,
    focus: Field,
    type_cursor: usize,
    error: Option<QuickAddError>,
}

impl QuickAddPartyState {
    /// Open for `request` with `default_types` pre-selected.
    pub fn new(id: HitId, request: CreationRequest, default_types: &[PartyType]) -> Self {
        let mut values: [String; 5] = Default::default();
        values[0] = request.seed_query().trim().to_owned();
        let mut types = Vec::new();
        for &kind in default_types {
            if !types.contains(&kind) {
                types.push(kind);
            }
        }
        Self {
            id,
            request,
            values,
            types,
            focus: Field::Name,
            type_cursor: 0,
            error: None,
        }
    }

    #[inline]
    pub fn id(&self) -> HitId {
        self.id
    }

    pub fn correlation(&self) -> CorrelationId {
        self.request.correlation()
    }

    pub fn value(&self, field: Field) -> &str {
        Field::TEXT
            .iter()
            .position(|&f| f == field)
            .map_or("", |i| &self.values[i])
    }

    pub fn set_value(&mut self, field: Field, text: impl Into<String>) {
        if let Some(i) = Field::TEXT.iter().position(|&f| f == field) {
            self.values[i] = text.into();
            self.error = None;
        }
    }

    pub fn focus(&self) -> Field {
        self.focus
    }

    pub fn set_focus(&mut self, field: Field) {
        self.focus = field;
    }

    /// Selected party types in selection order.
    pub fn selected_types(&self) -> &[PartyType] {
        &self.types
    }

    /// Toggle `kind`; returns whether it is now selected.
    pub fn toggle_type(&mut self, kind: PartyType) -> bool {
        self.error = None;
        if let Some(pos) = self.types.iter().position(|&t| t == kind) {
            self.types.remove(pos);
            false
        } else {
            self.types.push(kind);
            true
        }
    }

    /// Whether the submit button is live.
    pub fn can_submit(&self) -> bool {
        !self.types.is_empty()
    }

    /// Error from the last rejected submit, cleared on the next edit.
    pub fn error(&self) -> Option<&QuickAddError> {
        self.error.as_ref()
    }

    /// Check the form and build the payload.
    pub fn submit(&mut self) -> Result<NewParty, QuickAddError> {
        let result = self.build();
        self.error = result.as_ref().err().cloned();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "quick_add.submit",
            correlation = self.request.correlation().get(),
            ok = result.is_ok()
        );
        result
    }

    fn build(&self) -> Result<NewParty, QuickAddError> {
        if self.types.is_empty() {
            return Err(QuickAddError::NoPartyType);
        }
        let name = self.values[0].trim();
        if name.chars().count() < MIN_NAME_CHARS {
            return Err(QuickAddError::NameTooShort { min: MIN_NAME_CHARS });
        }
        let email = optional(&self.values[3]);
        if email.as_deref().is_some_and(|e| !looks_like_email(e)) {
            return Err(QuickAddError::InvalidEmail);
        }
        Ok(NewParty {
            name: name.to_owned(),
            short_name: optional(&self.values[1]),
            contact_person: optional(&self.values[2]),
            email,
            phone: optional(&self.values[4]),
            party_types: self.types.clone(),
            credit_limit: 0,
            credit_days: 0,
            tds_rate: 0.0,
            tds_applicable: false,
        })
    }

    /// The party was created; hand its id back to the selector.
    pub fn complete(self, party_id: impl Into<String>) -> Result<(), CreationError> {
        self.request.complete(party_id)
    }

    /// Dismiss without creating anything.
    pub fn cancel(self) -> Result<(), CreationError> {
        self.request.cancel()
    }

    fn edit(&mut self, f: impl FnOnce(&mut String) -> bool) {
        if let Some(i) = Field::TEXT.iter().position(|&field| field == self.focus)
            && f(&mut self.values[i])
        {
            self.error = None;
        }
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct QuickAddParty<'a> {
    title: &'a str,
    subtitle: &'a str,
}

impl Default for QuickAddParty<'_> {
    fn default() -> Self {
        Self {
            title: "Quick Add Party",
            subtitle: "Add a new party quickly during job creation",
        }
    }
}

impl<'a> QuickAddParty<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }

    #[must_use]
    pub fn subtitle(mut self, subtitle: &'a str) -> Self {
        self.subtitle = subtitle;
        self
    }

    /// Height of the dialog, border included.
    pub fn height() -> u16 {
        let type_rows = PartyType::ALL.len().div_ceil(TYPE_COLUMNS) as u16;
        // border, title, subtitle, gap, fields, gap, types label, types, error, buttons
        2 + 1 + 1 + 1 + Field::TEXT.len() as u16 + 1 + 1 + type_rows + 1 + 1
    }

    /// Centered dialog area inside `area`.
    pub fn modal_area(area: Rect) -> Rect {
        let width = MODAL_WIDTH.min(area.width);
        let height = Self::height().min(area.height);
        Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        )
    }

    pub fn handle_event(
        &self,
        state: &mut QuickAddPartyState,
        event: &Event,
        hit: Option<(HitId, HitRegion, HitData)>,
    ) -> Option<QuickAddAction> {
        match event {
            Event::Key(key) if key.is_actionable() => self.handle_key(state, key),
            Event::Paste(paste) => {
                let text: String = paste.text.chars().filter(|c| !c.is_control()).collect();
                state.edit(|value| {
                    value.push_str(&text);
                    !text.is_empty()
                });
                None
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                let (id, region, data) = hit?;
                if id != state.id {
                    return None;
                }
                match region {
                    FIELD => {
                        state.focus = Field::ORDER.get(data as usize).copied()?;
                        None
                    }
                    TYPE => {
                        let kind = PartyType::ALL.get(data as usize).copied()?;
                        state.focus = Field::Types;
                        state.type_cursor = data as usize;
                        state.toggle_type(kind);
                        None
                    }
                    BUTTON if data == SUBMIT => self.try_submit(state),
                    BUTTON if data == CANCEL => Some(QuickAddAction::Cancel),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn try_submit(&self, state: &mut QuickAddPartyState) -> Option<QuickAddAction> {
        state.submit().ok().map(QuickAddAction::Submit)
    }

    fn handle_key(&self, state: &mut QuickAddPartyState, key: &KeyEvent) -> Option<QuickAddAction> {
        match key.code {
            KeyCode::Escape => return Some(QuickAddAction::Cancel),
            KeyCode::Enter => return self.try_submit(state),
            KeyCode::Tab | KeyCode::Down if state.focus != Field::Types || key.code == KeyCode::Tab => {
                state.focus = state.focus.step(1);
            }
            KeyCode::BackTab | KeyCode::Up
                if state.focus != Field::Types || key.code == KeyCode::BackTab =>
            {
                state.focus = state.focus.step(-1);
            }
            _ if state.focus == Field::Types => self.handle_type_key(state, key),
            KeyCode::Backspace => state.edit(pop_grapheme),
            _ => {
                if let Some(ch) = key.printable() {
                    state.edit(|value| {
                        value.push(ch);
                        true
                    });
                }
            }
        }
        None
    }

    fn handle_type_key(&self, state: &mut QuickAddPartyState, key: &KeyEvent) {
        let count = PartyType::ALL.len();
        let cursor = state.type_cursor;
        match key.code {
            KeyCode::Left => state.type_cursor = cursor.saturating_sub(1),
            KeyCode::Right => state.type_cursor = (cursor + 1).min(count - 1),
            KeyCode::Up if cursor < TYPE_COLUMNS => state.focus = state.focus.step(-1),
            KeyCode::Up => state.type_cursor = cursor - TYPE_COLUMNS,
            KeyCode::Down => state.type_cursor = (cursor + TYPE_COLUMNS).min(count - 1),
            KeyCode::Char(' ') => {
                state.toggle_type(PartyType::ALL[cursor]);
            }
            _ => {}
        }
    }

    fn render_fields(&self, inner: Rect, y: u16, frame: &mut Frame, state: &QuickAddPartyState) {
        for (i, &field) in Field::TEXT.iter().enumerate() {
            let Some(row) = inner.row(y - inner.y + i as u16) else {
                return;
            };
            let focused = state.focus == field;
            let label_style = if focused {
                Style::new().bold()
            } else {
                Style::new().fg(Color::Muted)
            };
            draw_line(&mut frame.buffer, row, field.label(), label_style);
            let value_area = Rect::new(
                row.x + LABEL_WIDTH.min(row.width),
                row.y,
                row.width.saturating_sub(LABEL_WIDTH),
                1,
            );
            let end = draw_line(&mut frame.buffer, value_area, state.value(field), Style::new());
            frame.buffer.set_style(value_area, Style::new().underline());
            if focused && !value_area.is_empty() {
                frame.set_cursor(Some((end.min(value_area.right() - 1), row.y)));
            }
            frame.register_hit(row, state.id, FIELD, field.index() as HitData);
        }
    }

    fn render_types(&self, inner: Rect, y: u16, frame: &mut Frame, state: &QuickAddPartyState) {
        let cell_w = inner.width / TYPE_COLUMNS as u16;
        for (i, &kind) in PartyType::ALL.iter().enumerate() {
            let row_y = y + (i / TYPE_COLUMNS) as u16;
            if row_y >= inner.bottom() || cell_w == 0 {
                return;
            }
            let x = inner.x + (i % TYPE_COLUMNS) as u16 * cell_w;
            let cell = Rect::new(x, row_y, cell_w, 1);
            let mark = if state.types.contains(&kind) { 'x' } else { ' ' };
            let mut style = Style::new();
            if state.focus == Field::Types && state.type_cursor == i {
                style = style.reverse();
            }
            draw_line(&mut frame.buffer, cell, &format!("[{mark}] {}", kind.label()), style);
            frame.register_hit(cell, state.id, TYPE, i as HitData);
        }
    }

    fn render_buttons(&self, row: Rect, frame: &mut Frame, state: &QuickAddPartyState) {
        let submit = "[ Add Party ]";
        let cancel = "[ Cancel ]";
        let submit_w = display_width(submit) as u16;
        let cancel_w = display_width(cancel) as u16;
        if row.width < submit_w + cancel_w + 1 {
            return;
        }
        let submit_x = row.right() - submit_w;
        let cancel_x = submit_x - 1 - cancel_w;
        let submit_style = if state.can_submit() {
            Style::new().fg(Color::Accent).bold()
        } else {
            Style::new().dim()
        };
        frame.buffer.set_string(cancel_x, row.y, cancel, Style::new(), submit_x);
        frame.buffer.set_string(submit_x, row.y, submit, submit_style, row.right());
        frame.register_hit(Rect::new(cancel_x, row.y, cancel_w, 1), state.id, BUTTON, CANCEL);
        frame.register_hit(Rect::new(submit_x, row.y, submit_w, 1), state.id, BUTTON, SUBMIT);
    }
}

impl StatefulWidget for QuickAddParty<'_> {
    type State = QuickAddPartyState;

    /// Draw the dialog centered in `area`.
    fn render(&self, area: Rect, frame: &mut Frame, state: &mut QuickAddPartyState) {
        let modal = Self::modal_area(area);
        if modal.width < 20 || modal.height < Self::height() {
            return;
        }
        clear_area(&mut frame.buffer, modal);
        draw_border(&mut frame.buffer, modal, Style::new().fg(Color::Accent));
        let inner = modal.inner(Sides::all(1)).inner(Sides::horizontal(1));

        let mut y = inner.y;
        let line = |y: u16| Rect::new(inner.x, y, inner.width, 1);
        draw_line(&mut frame.buffer, line(y), self.title, Style::new().bold());
        y += 1;
        draw_line(&mut frame.buffer, line(y), self.subtitle, Style::new().fg(Color::Muted));
        y += 2;

        self.render_fields(inner, y, frame, state);
        y += Field::TEXT.len() as u16 + 1;

        draw_line(&mut frame.buffer, line(y), Field::Types.label(), Style::new().fg(Color::Muted));
        y += 1;
        self.render_types(inner, y, frame, state);
        y += PartyType::ALL.len().div_ceil(TYPE_COLUMNS) as u16;

        if let Some(error) = &state.error {
            draw_line(
                &mut frame.buffer,
                line(y),
                &error.to_string(),
                Style::new().fg(Color::Danger),
            );
        }
        y += 1;
        self.render_buttons(line(y), frame, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fdesk_runtime::creation::{CreationPoll, creation_channel};

    fn dialog(seed: &str, types: &[PartyType]) -> (QuickAddPartyState, fdesk_runtime::PendingCreation) {
        let (request, pending) = creation_channel(seed);
        (QuickAddPartyState::new(HitId::new(9), request, types), pending)
    }

    #[test]
    fn name_seeded_from_query() {
        let (state, _pending) = dialog("  Maersk ", &[PartyType::Vendor]);
        assert_eq!(state.value(Field::Name), "Maersk");
        assert_eq!(state.selected_types(), [PartyType::Vendor]);
    }

    #[test]
    fn submit_requires_a_party_type() {
        let (mut state, _pending) = dialog("Maersk", &[]);
        assert!(!state.can_submit());
        assert_eq!(state.submit(), Err(QuickAddError::NoPartyType));
        assert_eq!(
            state.error().map(ToString::to_string).as_deref(),
            Some("At least one party type is required")
        );
        state.toggle_type(PartyType::Shipper);
        assert!(state.error().is_none());
        assert!(state.submit().is_ok());
    }

    #[test]
    fn submit_requires_two_character_name() {
        let (mut state, _pending) = dialog("M", &[PartyType::Shipper]);
        assert_eq!(state.submit(), Err(QuickAddError::NameTooShort { min: 2 }));
        state.set_value(Field::Name, "Mk");
        assert_eq!(state.submit().map(|p| p.name), Ok("Mk".to_owned()));
    }

    #[test]
    fn email_checked_only_when_given() {
        let (mut state, _pending) = dialog("Maersk", &[PartyType::Shipper]);
        state.set_value(Field::Email, "ops at maersk");
        assert_eq!(state.submit(), Err(QuickAddError::InvalidEmail));
        state.set_value(Field::Email, "ops@maersk.test");
        let party = state.submit().unwrap();
        assert_eq!(party.email.as_deref(), Some("ops@maersk.test"));
        assert_eq!(party.credit_limit, 0);
        assert!(!party.tds_applicable);
    }

    #[test]
    fn toggle_twice_deselects() {
        let (mut state, _pending) = dialog("", &[PartyType::Shipper, PartyType::Shipper]);
        assert_eq!(state.selected_types().len(), 1);
        assert!(!state.toggle_type(PartyType::Shipper));
        assert!(state.toggle_type(PartyType::Consignee));
    }

    #[test]
    fn complete_reaches_the_selector() {
        let (state, mut pending) = dialog("Maersk", &[PartyType::Shipper]);
        state.complete("p-77").unwrap();
        assert_eq!(pending.poll(), CreationPoll::Created("p-77".into()));
    }

    #[test]
    fn keyboard_editing_and_submit() {
        let widget = QuickAddParty::new();
        let (mut state, _pending) = dialog("Ma", &[]);
        for ch in "ersk".chars() {
            widget.handle_event(&mut state, &Event::key(KeyCode::Char(ch)), None);
        }
        assert_eq!(state.value(Field::Name), "Maersk");
        assert_eq!(widget.handle_event(&mut state, &Event::key(KeyCode::Enter), None), None);
        assert_eq!(state.error(), Some(&QuickAddError::NoPartyType));

        for _ in 0..5 {
            widget.handle_event(&mut state, &Event::key(KeyCode::Tab), None);
        }
        assert_eq!(state.focus(), Field::Types);
        widget.handle_event(&mut state, &Event::key(KeyCode::Right), None);
        widget.handle_event(&mut state, &Event::key(KeyCode::Char(' ')), None);
        assert_eq!(state.selected_types(), [PartyType::Consignee]);

        let action = widget.handle_event(&mut state, &Event::key(KeyCode::Enter), None);
        assert!(matches!(action, Some(QuickAddAction::Submit(ref p)) if p.name == "Maersk"));
        let escape = widget.handle_event(&mut state, &Event::key(KeyCode::Escape), None);
        assert_eq!(escape, Some(QuickAddAction::Cancel));
    }

    #[test]
    fn renders_and_routes_buttons() {
        let widget = QuickAddParty::new();
        let (mut state, _pending) = dialog("Maersk", &[PartyType::Shipper]);
        let mut frame = Frame::with_hit_grid(80, 24);
        widget.render(frame.bounds(), &mut frame, &mut state);
        let text = frame.buffer.to_lines().join("\n");
        assert!(text.contains("Quick Add Party"));
        assert!(text.contains("[x] Shipper"));
        assert!(text.contains("[ ] Vendor"));

        let modal = QuickAddParty::modal_area(frame.bounds());
        let y = modal.bottom() - 2;
        let x = modal.right() - 3;
        let hit = frame.hit_test(x, y);
        assert_eq!(hit, Some((HitId::new(9), BUTTON, SUBMIT)));
        let action = widget.handle_event(&mut state, &Event::click(x, y), hit);
        assert!(matches!(action, Some(QuickAddAction::Submit(_))));
    }
}
