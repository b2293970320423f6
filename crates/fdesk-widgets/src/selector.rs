#![forbid(unsafe_code)]

//! Searchable single-select.
//!
//! [`Selector`] holds the per-render props (the option snapshot, the
//! controlled value, labels and flags); [`SelectorState`] holds what survives
//! between renders: open/closed, the in-overlay query and its debounce timer,
//! the highlighted row, the outside-click listener and any outstanding
//! creation request.
//!
//! # Lifecycle
//!
//! ```text
//!            trigger / Enter / Down            select / Escape / outside press
//!   Closed ─────────────────────────▶ Open ───────────────────────────────────▶ Closed
//!                                      │         (query cleared, listener dropped)
//!                                      └── "add new" ──▶ Closed + creation request
//! ```
//!
//! The selector never writes the value itself. It returns
//! [`SelectorEvent::Changed`] and the parent form decides.
//!
//! # Host wiring
//!
//! - Render with a hit grid and render open selectors after everything else
//!   so their overlay is on top.
//! - On a primary press, first call
//!   [`PointerListeners::outside_of`](fdesk_runtime::PointerListeners::outside_of)
//!   with the hit owner and call [`SelectorState::on_outside_pointer`] for each
//!   returned id, then route the press with [`Selector::handle_event`].
//! - Call [`SelectorState::tick`] from the event loop to publish debounced
//!   searches and pick up answered creation requests.

use crate::popover::{Placement, Popover};
use crate::{StatefulWidget, draw_line};
use fdesk_catalog::option::{OptionFields, SelectOption};
use fdesk_core::event::{Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use fdesk_core::geometry::Rect;
use fdesk_core::text_width::{display_width, pop_grapheme};
use fdesk_render::cell::{Cell, Color, Style};
use fdesk_render::frame::{Frame, HitData, HitId, HitRegion};
use fdesk_runtime::config::WidgetConfig;
use fdesk_runtime::creation::{CreationPoll, CreationRequest, PendingCreation, creation_channel};
use fdesk_runtime::debounce::SearchController;
use fdesk_runtime::listener::{ListenerGuard, PointerListeners};
use web_time::Instant;

/// Trigger row.
pub const TRIGGER: HitRegion = HitRegion::Custom(1);
/// Clear button on the trigger row.
pub const CLEAR: HitRegion = HitRegion::Button;
/// Search box inside the overlay.
pub const SEARCH: HitRegion = HitRegion::Custom(2);
/// Option row; hit data is the option's index in the props slice.
pub const OPTION: HitRegion = HitRegion::Content;
/// "Add new" row.
pub const ADD_NEW: HitRegion = HitRegion::Custom(3);
/// Overlay chrome (border, messages).
pub const OVERLAY: HitRegion = HitRegion::Custom(4);

/// What a selector asks its parent to do.
#[derive(Debug)]
pub enum SelectorEvent {
    /// New controlled value.
    Changed(Option<String>),
    /// Debounced query for a remote search.
    Search(String),
    /// Run a creation flow and answer the request.
    AddNew(CreationRequest),
}

impl SelectorEvent {
    /// Apply a [`Changed`](Self::Changed) event to `value`. Returns whether
    /// anything changed.
    pub fn apply_to(&self, value: &mut Option<String>) -> bool {
        match self {
            Self::Changed(next) if next != value => {
                value.clone_from(next);
                true
            }
            _ => false,
        }
    }
}

/// User-facing strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorLabels {
    pub search_placeholder: String,
    pub loading: String,
    pub empty: String,
    pub no_results: String,
    pub add_new: String,
    pub selected: String,
}

impl SelectorLabels {
    pub fn from_config(config: &WidgetConfig) -> Self {
        Self {
            search_placeholder: config.search_placeholder.clone(),
            loading: config.loading_label.clone(),
            empty: config.empty_label.clone(),
            no_results: config.no_results_label.clone(),
            add_new: config.add_new_label.clone(),
            selected: "Selected".into(),
        }
    }
}

impl Default for SelectorLabels {
    fn default() -> Self {
        Self::from_config(&WidgetConfig::default())
    }
}

/// Indices of `options` whose `search_key` field contains `query`,
/// case-insensitively. A blank query keeps everything.
pub fn filter_options<E: OptionFields>(
    options: &[SelectOption<E>],
    query: &str,
    search_key: &str,
) -> Vec<usize> {
    if query.trim().is_empty() {
        return (0..options.len()).collect();
    }
    let needle = query.to_lowercase();
    options
        .iter()
        .enumerate()
        .filter(|(_, option)| {
            option
                .field(search_key)
                .is_some_and(|value| value.to_lowercase().contains(&needle))
        })
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct SelectorState {
    id: HitId,
    open: bool,
    search: SearchController,
    remote_search: bool,
    highlighted: usize,
    /// Filtered option count the highlight was last placed against.
    seen_options: Option<usize>,
    offset: usize,
    listeners: Option<PointerListeners>,
    listener: Option<ListenerGuard>,
    pending: Option<PendingCreation>,
}

impl SelectorState {
    pub fn new(id: HitId) -> Self {
        Self {
            id,
            open: false,
            search: SearchController::default(),
            remote_search: false,
            highlighted: 0,
            seen_options: None,
            offset: 0,
            listeners: None,
            listener: None,
            pending: None,
        }
    }

    /// Use the configured debounce window.
    #[must_use]
    pub fn with_config(mut self, config: &WidgetConfig) -> Self {
        self.search.set_window(config.debounce());
        self
    }

    /// Register for outside presses with `listeners` while open.
    #[must_use]
    pub fn with_listeners(mut self, listeners: PointerListeners) -> Self {
        self.listeners = Some(listeners);
        self
    }

    /// Publish debounced queries as [`SelectorEvent::Search`].
    #[must_use]
    pub fn with_remote_search(mut self, remote: bool) -> Self {
        self.remote_search = remote;
        self
    }

    #[inline]
    pub fn id(&self) -> HitId {
        self.id
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// In-overlay query as typed.
    #[inline]
    pub fn query(&self) -> &str {
        self.search.raw_query()
    }

    /// Last query published after the quiescence window.
    #[inline]
    pub fn debounced_query(&self) -> &str {
        self.search.debounced_query()
    }

    /// Highlighted row: an index into the filtered list, or one past its end
    /// for the "add new" row.
    #[inline]
    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn is_search_pending(&self) -> bool {
        self.search.is_pending()
    }

    pub fn is_listening(&self) -> bool {
        self.listener.is_some()
    }

    pub fn has_pending_creation(&self) -> bool {
        self.pending.is_some()
    }

    /// Replace the query and restart the debounce window.
    pub fn set_query(&mut self, text: impl Into<String>, now: Instant) {
        self.search.set_query(text, now);
        self.highlighted = 0;
        self.seen_options = None;
        self.offset = 0;
    }

    /// Open the overlay with `highlight` as the starting row.
    pub fn open(&mut self, highlight: usize) {
        if self.open {
            return;
        }
        self.open = true;
        self.highlighted = highlight;
        self.seen_options = None;
        self.offset = 0;
        self.listener = self.listeners.as_ref().map(|l| l.register(self.id));
        #[cfg(feature = "tracing")]
        tracing::debug!(message = "selector.open", id = self.id.id());
    }

    /// Close the overlay and clear the query. Closing an already closed
    /// selector does nothing.
    pub fn close(&mut self, now: Instant) {
        if !self.open {
            return;
        }
        self.open = false;
        self.listener = None;
        self.highlighted = 0;
        self.seen_options = None;
        self.offset = 0;
        if !self.search.raw_query().is_empty() {
            self.search.set_query(String::new(), now);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(message = "selector.close", id = self.id.id());
    }

    /// Choose `option`: close, clear the query, and report its id.
    pub fn select<E>(&mut self, option: &SelectOption<E>, now: Instant) -> SelectorEvent {
        self.close(now);
        #[cfg(feature = "tracing")]
        tracing::debug!(message = "selector.select", id = self.id.id(), value = %option.id);
        SelectorEvent::Changed(Some(option.id.clone()))
    }

    /// Drop the selection. Never opens the overlay.
    pub fn clear(&mut self, now: Instant) -> SelectorEvent {
        self.close(now);
        #[cfg(feature = "tracing")]
        tracing::debug!(message = "selector.clear", id = self.id.id());
        SelectorEvent::Changed(None)
    }

    /// Close and issue a creation request seeded with the current query.
    ///
    /// A previous unanswered request is abandoned; its answer will fail as
    /// detached.
    pub fn add_new(&mut self, now: Instant) -> SelectorEvent {
        let (request, pending) = creation_channel(self.search.raw_query());
        self.pending = Some(pending);
        self.close(now);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "selector.add_new",
            id = self.id.id(),
            correlation = request.correlation().get()
        );
        SelectorEvent::AddNew(request)
    }

    /// A primary press landed outside this selector.
    ///
    /// Returns whether the overlay was open.
    pub fn on_outside_pointer(&mut self, now: Instant) -> bool {
        let was_open = self.open;
        self.close(now);
        was_open
    }

    /// Advance timers and poll the creation channel.
    pub fn tick(&mut self, now: Instant) -> Vec<SelectorEvent> {
        let mut events = Vec::new();
        if let Some(query) = self.search.tick(now)
            && self.remote_search
        {
            events.push(SelectorEvent::Search(query));
        }
        if let Some(pending) = self.pending.as_mut() {
            match pending.poll() {
                CreationPoll::Waiting => {}
                CreationPoll::Created(id) => {
                    self.pending = None;
                    #[cfg(feature = "tracing")]
                    tracing::debug!(message = "selector.created", id = self.id.id(), value = %id);
                    events.push(SelectorEvent::Changed(Some(id)));
                }
                CreationPoll::Cancelled => self.pending = None,
            }
        }
        events
    }

    /// Keep the highlight on a real row when the option list changes under
    /// it. A highlight on the "add new" row follows that row.
    fn sync_options(&mut self, options: usize) {
        if self.seen_options == Some(options) {
            return;
        }
        let on_add_new = self.seen_options == Some(self.highlighted);
        self.highlighted = if on_add_new {
            options
        } else {
            self.highlighted.min(options.saturating_sub(1))
        };
        self.seen_options = Some(options);
    }

    fn move_highlight(&mut self, delta: isize, entries: usize) {
        if entries == 0 {
            self.highlighted = 0;
            return;
        }
        let last = entries - 1;
        self.highlighted = self.highlighted.saturating_add_signed(delta).min(last);
    }
}

// ---------------------------------------------------------------------------
// Props
// ---------------------------------------------------------------------------

/// One render's worth of selector props.
#[derive(Debug, Clone)]
pub struct Selector<'a, E = ()> {
    options: &'a [SelectOption<E>],
    value: Option<&'a str>,
    placeholder: &'a str,
    display_key: &'a str,
    search_key: &'a str,
    disabled: bool,
    loading: bool,
    error: Option<&'a str>,
    required_message: Option<&'a str>,
    add_new: bool,
    show_code: bool,
    show_email: bool,
    show_type: bool,
    max_rows: u16,
    labels: SelectorLabels,
}

impl<'a, E: OptionFields> Selector<'a, E> {
    pub fn new(options: &'a [SelectOption<E>]) -> Self {
        Self {
            options,
            value: None,
            placeholder: "Select...",
            display_key: "name",
            search_key: "name",
            disabled: false,
            loading: false,
            error: None,
            required_message: None,
            add_new: false,
            show_code: false,
            show_email: false,
            show_type: false,
            max_rows: WidgetConfig::default().overlay_max_rows,
            labels: SelectorLabels::default(),
        }
    }

    /// Apply row limit and labels from `config`.
    #[must_use]
    pub fn config(mut self, config: &WidgetConfig) -> Self {
        self.max_rows = config.overlay_max_rows;
        self.labels = SelectorLabels::from_config(config);
        self
    }

    #[must_use]
    pub fn value(mut self, value: Option<&'a str>) -> Self {
        self.value = value;
        self
    }

    #[must_use]
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    #[must_use]
    pub fn search_placeholder(mut self, text: impl Into<String>) -> Self {
        self.labels.search_placeholder = text.into();
        self
    }

    #[must_use]
    pub fn display_key(mut self, key: &'a str) -> Self {
        self.display_key = key;
        self
    }

    #[must_use]
    pub fn search_key(mut self, key: &'a str) -> Self {
        self.search_key = key;
        self
    }

    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    #[must_use]
    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    #[must_use]
    pub fn error(mut self, error: Option<&'a str>) -> Self {
        self.error = error;
        self
    }

    /// Message shown under the trigger while nothing is selected.
    #[must_use]
    pub fn required(mut self, message: &'a str) -> Self {
        self.required_message = Some(message);
        self
    }

    /// Offer the "add new" row.
    #[must_use]
    pub fn add_new(mut self, enabled: bool) -> Self {
        self.add_new = enabled;
        self
    }

    #[must_use]
    pub fn add_new_label(mut self, label: impl Into<String>) -> Self {
        self.labels.add_new = label.into();
        self
    }

    #[must_use]
    pub fn show_code(mut self, show: bool) -> Self {
        self.show_code = show;
        self
    }

    #[must_use]
    pub fn show_email(mut self, show: bool) -> Self {
        self.show_email = show;
        self
    }

    #[must_use]
    pub fn show_type(mut self, show: bool) -> Self {
        self.show_type = show;
        self
    }

    #[must_use]
    pub fn max_rows(mut self, rows: u16) -> Self {
        self.max_rows = rows.max(1);
        self
    }

    #[must_use]
    pub fn labels(mut self, labels: SelectorLabels) -> Self {
        self.labels = labels;
        self
    }

    /// The option matching the controlled value, if it is in the snapshot.
    pub fn selected_option(&self) -> Option<&'a SelectOption<E>> {
        let value = self.value?;
        self.options.iter().find(|o| o.id == value)
    }

    fn label_of<'o>(&self, option: &'o SelectOption<E>) -> &'o str {
        option.field(self.display_key).unwrap_or(&option.name)
    }

    /// Option indices visible for `query`.
    pub fn filtered(&self, query: &str) -> Vec<usize> {
        filter_options(self.options, query, self.search_key)
    }

    fn shows_add_new(&self) -> bool {
        self.add_new && !self.loading
    }

    /// Message for an empty list.
    pub fn empty_message(&self, query: &str) -> &str {
        if query.is_empty() {
            &self.labels.empty
        } else {
            &self.labels.no_results
        }
    }

    fn detail_line(&self, option: &SelectOption<E>) -> Option<String> {
        let mut parts = Vec::new();
        if self.show_code
            && let Some(code) = option.code()
        {
            parts.push(format!("Code: {code}"));
        }
        if self.show_email
            && let Some(email) = option.email()
        {
            parts.push(email.to_owned());
        }
        if self.show_type
            && let Some(kind) = option.kind()
        {
            parts.push(format!("Type: {kind}"));
        }
        (!parts.is_empty()).then(|| parts.join("  "))
    }

    fn option_height(&self) -> u16 {
        if self.show_code || self.show_email || self.show_type {
            2
        } else {
            1
        }
    }

    /// Open the overlay unless disabled. The selected option starts
    /// highlighted.
    pub fn open(&self, state: &mut SelectorState) -> bool {
        if self.disabled || state.open {
            return false;
        }
        let start = self
            .value
            .and_then(|v| self.filtered(state.query()).iter().position(|&i| self.options[i].id == v))
            .unwrap_or(0);
        state.open(start);
        true
    }

    /// Route an event. Keys should only reach the focused selector; pointer
    /// presses come with the frame's hit-test result.
    pub fn handle_event(
        &self,
        state: &mut SelectorState,
        event: &Event,
        hit: Option<(HitId, HitRegion, HitData)>,
        now: Instant,
    ) -> Option<SelectorEvent> {
        match event {
            Event::Key(key) => self.handle_key(state, key, now),
            Event::Mouse(mouse) => self.handle_mouse(state, mouse, hit, now),
            Event::Paste(paste) if state.open && !self.disabled => {
                let mut query = state.query().to_owned();
                query.extend(paste.text.chars().filter(|c| !c.is_control()));
                state.set_query(query, now);
                None
            }
            _ => None,
        }
    }

    fn handle_key(
        &self,
        state: &mut SelectorState,
        key: &KeyEvent,
        now: Instant,
    ) -> Option<SelectorEvent> {
        if !key.is_actionable() || self.disabled {
            return None;
        }
        if !state.open {
            return match key.code {
                KeyCode::Enter | KeyCode::Down | KeyCode::Char(' ') => {
                    self.open(state);
                    None
                }
                KeyCode::Delete if self.value.is_some() => Some(state.clear(now)),
                _ => None,
            };
        }

        let filtered = self.filtered(state.query());
        state.sync_options(filtered.len());
        let entries = filtered.len() + usize::from(self.shows_add_new());
        let page = (self.max_rows / self.option_height()).max(1) as isize;
        match key.code {
            KeyCode::Escape => state.close(now),
            KeyCode::Up => state.move_highlight(-1, entries),
            KeyCode::Down => state.move_highlight(1, entries),
            KeyCode::PageUp => state.move_highlight(-page, entries),
            KeyCode::PageDown => state.move_highlight(page, entries),
            KeyCode::Home => state.highlighted = 0,
            KeyCode::End => state.highlighted = entries.saturating_sub(1),
            KeyCode::Enter => return self.activate(state, &filtered, now),
            KeyCode::Backspace => {
                let mut query = state.query().to_owned();
                if pop_grapheme(&mut query) {
                    state.set_query(query, now);
                }
            }
            _ => {
                if let Some(ch) = key.printable() {
                    let mut query = state.query().to_owned();
                    query.push(ch);
                    state.set_query(query, now);
                }
            }
        }
        None
    }

    fn activate(
        &self,
        state: &mut SelectorState,
        filtered: &[usize],
        now: Instant,
    ) -> Option<SelectorEvent> {
        if self.loading {
            return None;
        }
        match filtered.get(state.highlighted) {
            Some(&index) => Some(state.select(&self.options[index], now)),
            None if self.shows_add_new() && state.highlighted == filtered.len() => {
                Some(state.add_new(now))
            }
            None => None,
        }
    }

    fn handle_mouse(
        &self,
        state: &mut SelectorState,
        mouse: &MouseEvent,
        hit: Option<(HitId, HitRegion, HitData)>,
        now: Instant,
    ) -> Option<SelectorEvent> {
        let (id, region, data) = hit?;
        if id != state.id {
            return None;
        }
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => match region {
                CLEAR => {
                    if self.disabled || self.value.is_none() {
                        return None;
                    }
                    Some(state.clear(now))
                }
                TRIGGER => {
                    if state.open {
                        state.close(now);
                    } else {
                        self.open(state);
                    }
                    None
                }
                OPTION if state.open => {
                    let option = self.options.get(data as usize)?;
                    Some(state.select(option, now))
                }
                ADD_NEW if state.open && self.shows_add_new() => Some(state.add_new(now)),
                _ => None,
            },
            MouseEventKind::Moved if state.open && region == OPTION => {
                if let Some(pos) = self
                    .filtered(state.query())
                    .iter()
                    .position(|&i| i as HitData == data)
                {
                    state.highlighted = pos;
                }
                None
            }
            MouseEventKind::ScrollUp if state.open => {
                let entries = self.filtered(state.query()).len() + usize::from(self.shows_add_new());
                state.move_highlight(-1, entries);
                None
            }
            MouseEventKind::ScrollDown if state.open => {
                let entries = self.filtered(state.query()).len() + usize::from(self.shows_add_new());
                state.move_highlight(1, entries);
                None
            }
            _ => None,
        }
    }

    // -- rendering ----------------------------------------------------------

    fn render_trigger(&self, row: Rect, frame: &mut Frame, state: &SelectorState) {
        let base = if self.disabled {
            Style::new().dim()
        } else if self.error.is_some() {
            Style::new().fg(Color::Danger)
        } else {
            Style::new()
        };
        frame.register_hit(row, state.id, TRIGGER, 0);

        let arrow_x = row.right() - 1;
        let arrow = if state.open { '▴' } else { '▾' };
        frame
            .buffer
            .set(arrow_x, row.y, Cell::from_char(arrow).with_style(base));
        let mut text_end = arrow_x.saturating_sub(1);

        let selected = self.selected_option();
        if selected.is_some() && !self.disabled && row.width >= 4 {
            let clear_x = arrow_x - 2;
            frame
                .buffer
                .set(clear_x, row.y, Cell::from_char('×').with_style(base));
            frame.register_hit(Rect::new(clear_x, row.y, 1, 1), state.id, CLEAR, 0);
            text_end = clear_x.saturating_sub(1);
        }

        let (text, style) = match selected {
            Some(option) => (self.label_of(option), base),
            None => (self.placeholder, base.patch(Style::new().fg(Color::Muted))),
        };
        frame.buffer.set_string(row.x, row.y, text, style, text_end);
        frame.buffer.set_style(row, Style::new().underline());
    }

    fn render_message(&self, row: Rect, frame: &mut Frame) {
        let message = match (self.error, self.required_message) {
            (Some(error), _) => error,
            (None, Some(required)) if self.selected_option().is_none() => required,
            _ => return,
        };
        draw_line(&mut frame.buffer, row, message, Style::new().fg(Color::Danger));
    }

    fn render_overlay(&self, anchor: Rect, frame: &mut Frame, state: &mut SelectorState) {
        let query = state.query().to_owned();
        let filtered = self.filtered(&query);
        state.sync_options(filtered.len());
        let show_add = self.shows_add_new();
        let option_h = self.option_height();
        let body_rows = if self.loading || filtered.is_empty() {
            1
        } else {
            let wanted = (filtered.len() as u16).saturating_mul(option_h);
            wanted.min(self.max_rows.max(option_h))
        };
        let content_h = 1 + body_rows + u16::from(show_add);

        let popover = Popover::new(anchor, Placement::Below)
            .height(content_h)
            .bordered(true)
            .border_style(Style::new().fg(Color::Muted));
        let id = state.id;
        let viewport = frame.bounds();
        popover.render_with(viewport, frame, |inner, frame| {
            // Chrome first so rows registered below take precedence.
            frame.register_hit(
                Rect::new(inner.x - 1, inner.y - 1, inner.width + 2, inner.height + 2),
                id,
                OVERLAY,
                0,
            );
            let Some(search_row) = inner.row(0) else {
                return;
            };
            self.render_search(search_row, frame, id, &query);

            let add_rows = u16::from(show_add && inner.height >= 3);
            let body = Rect::new(
                inner.x,
                inner.y + 1,
                inner.width,
                inner.height.saturating_sub(1 + add_rows),
            );
            if self.loading {
                draw_line(&mut frame.buffer, body, &self.labels.loading, Style::new().fg(Color::Muted));
            } else if filtered.is_empty() {
                let message = self.empty_message(&query);
                draw_line(&mut frame.buffer, body, message, Style::new().fg(Color::Muted));
            } else {
                self.render_options(body, frame, state, &filtered);
            }

            if add_rows == 1 {
                let row = Rect::new(inner.x, inner.bottom() - 1, inner.width, 1);
                let mut style = Style::new().fg(Color::Accent).bold();
                if state.highlighted == filtered.len() {
                    style = style.reverse();
                    frame.buffer.set_style(row, Style::new().reverse());
                }
                draw_line(&mut frame.buffer, row, &format!("+ {}", self.labels.add_new), style);
                frame.register_hit(row, id, ADD_NEW, 0);
            }
        });
    }

    fn render_search(&self, row: Rect, frame: &mut Frame, id: HitId, query: &str) {
        frame.register_hit(row, id, SEARCH, 0);
        let prefix_end = draw_line(&mut frame.buffer, row, "⌕ ", Style::new().fg(Color::Muted));
        let text_area = Rect::new(prefix_end, row.y, row.right().saturating_sub(prefix_end), 1);
        if query.is_empty() {
            draw_line(
                &mut frame.buffer,
                text_area,
                &self.labels.search_placeholder,
                Style::new().fg(Color::Muted).dim(),
            );
            frame.set_cursor(Some((prefix_end, row.y)));
        } else {
            let end = draw_line(&mut frame.buffer, text_area, query, Style::new());
            let cursor_x = end.min(row.right().saturating_sub(1));
            frame.set_cursor(Some((cursor_x, row.y)));
        }
    }

    fn render_options(
        &self,
        body: Rect,
        frame: &mut Frame,
        state: &mut SelectorState,
        filtered: &[usize],
    ) {
        let option_h = self.option_height();
        let visible = usize::from((body.height / option_h).max(1));
        if state.highlighted < filtered.len() {
            if state.highlighted < state.offset {
                state.offset = state.highlighted;
            } else if state.highlighted >= state.offset + visible {
                state.offset = state.highlighted + 1 - visible;
            }
        }
        state.offset = state.offset.min(filtered.len().saturating_sub(visible));

        let marker = &self.labels.selected;
        let marker_w = display_width(marker) as u16;
        for (slot, (pos, &index)) in filtered
            .iter()
            .enumerate()
            .skip(state.offset)
            .take(visible)
            .enumerate()
        {
            let y = body.y + slot as u16 * option_h;
            if y >= body.bottom() {
                break;
            }
            let option = &self.options[index];
            let is_selected = self.value == Some(option.id.as_str());
            let rows = Rect::new(body.x, y, body.width, option_h.min(body.bottom() - y));
            let name_row = Rect::new(body.x, y, body.width, 1);

            let mut name_style = Style::new();
            if is_selected {
                name_style = name_style.fg(Color::Accent).bold();
            }
            let mut name_end = body.right();
            if is_selected && body.width > marker_w + 2 {
                name_end = body.right() - marker_w - 1;
                frame.buffer.set_string(
                    name_end + 1,
                    y,
                    marker,
                    Style::new().fg(Color::Accent),
                    body.right(),
                );
            }
            frame
                .buffer
                .set_string(body.x, y, self.label_of(option), name_style, name_end);

            if option_h == 2
                && rows.height == 2
                && let Some(detail) = self.detail_line(option)
            {
                draw_line(
                    &mut frame.buffer,
                    Rect::new(body.x + 1, y + 1, body.width.saturating_sub(1), 1),
                    &detail,
                    Style::new().fg(Color::Muted).dim(),
                );
            }
            if pos == state.highlighted {
                frame.buffer.set_style(name_row, Style::new().reverse());
            }
            frame.register_hit(rows, state.id, OPTION, index as HitData);
        }
    }
}

impl<E: OptionFields> StatefulWidget for Selector<'_, E> {
    type State = SelectorState;

    /// Draw the trigger, the message line (if `area` has a second row) and,
    /// when open, the overlay.
    fn render(&self, area: Rect, frame: &mut Frame, state: &mut SelectorState) {
        if area.is_empty() || area.width < 2 {
            return;
        }
        let Some(trigger) = area.row(0) else {
            return;
        };
        self.render_trigger(trigger, frame, state);
        if let Some(message_row) = area.row(1) {
            self.render_message(message_row, frame);
        }
        if state.open && !self.disabled {
            self.render_overlay(trigger, frame, state);
        }
    }
}
