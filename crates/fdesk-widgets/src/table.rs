#![forbid(unsafe_code)]

//! Sortable, paginated, searchable reference table.
//!
//! The table renders whatever page of rows it is given. Sorting, paging and
//! searching are reported as [`TableIntent`]s for the caller to turn into a
//! backend query; rows are never reordered or filtered locally.
//!
//! ```text
//! Search: air
//! Mode Name ▲   Mode Code   Status
//! ──────────────────────────────────
//! Airways       AIRWAYS     Active
//! ...
//! Page 1 of 3                 ‹ Prev  Next ›
//! ```

use crate::{StatefulWidget, draw_line};
use fdesk_core::event::{Event, KeyCode, KeyEvent, MouseButton, MouseEventKind};
use fdesk_core::geometry::Rect;
use fdesk_core::text_width::pop_grapheme;
use fdesk_render::cell::{Cell, Color, Style};
use fdesk_render::frame::{Frame, HitData, HitId, HitRegion};
use fdesk_runtime::config::WidgetConfig;
use std::fmt;

/// Search box.
pub const SEARCH: HitRegion = HitRegion::Custom(1);
/// Column header; hit data is the column index.
pub const HEADER: HitRegion = HitRegion::Custom(2);
/// Data row; hit data is the row index within the page.
pub const ROW: HitRegion = HitRegion::Content;
/// Pager buttons; hit data is [`PREV`] or [`NEXT`].
pub const PAGER: HitRegion = HitRegion::Button;

pub const PREV: HitData = 0;
pub const NEXT: HitData = 1;

const COLUMN_GAP: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub fn flip(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    fn arrow(self) -> char {
        match self {
            Self::Asc => '▲',
            Self::Desc => '▼',
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the caller should do in response to an interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableIntent {
    /// Re-query sorted by `column`.
    Sort {
        column: String,
        direction: SortDirection,
    },
    /// Fetch this page. Not clamped to the page count.
    Page(usize),
    /// The search box changed.
    Search(String),
    /// A row was activated; index within the current page.
    Activate(usize),
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TableState {
    id: HitId,
    page: usize,
    page_size: usize,
    sort_by: Option<String>,
    sort_dir: SortDirection,
    search_term: String,
    highlighted: Option<usize>,
    search_focused: bool,
}

impl TableState {
    pub fn new(id: HitId) -> Self {
        Self {
            id,
            page: 1,
            page_size: WidgetConfig::default().page_size,
            sort_by: None,
            sort_dir: SortDirection::Asc,
            search_term: String::new(),
            highlighted: None,
            search_focused: false,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: &WidgetConfig) -> Self {
        self.page_size = config.page_size.max(1);
        self
    }

    #[must_use]
    pub fn with_sort(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_by = Some(column.into());
        self.sort_dir = direction;
        self
    }

    #[inline]
    pub fn id(&self) -> HitId {
        self.id
    }

    #[inline]
    pub fn page(&self) -> usize {
        self.page
    }

    #[inline]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn sort(&self) -> Option<(&str, SortDirection)> {
        self.sort_by.as_deref().map(|c| (c, self.sort_dir))
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn is_search_focused(&self) -> bool {
        self.search_focused
    }

    pub fn focus_search(&mut self, focused: bool) {
        self.search_focused = focused;
    }

    /// Number of pages for `total` records, at least one.
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    /// Same column flips the direction; another column sorts ascending.
    pub fn on_sort(&mut self, column: &str) -> TableIntent {
        if self.sort_by.as_deref() == Some(column) {
            self.sort_dir = self.sort_dir.flip();
        } else {
            self.sort_by = Some(column.to_owned());
            self.sort_dir = SortDirection::Asc;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(message = "table.sort", column, direction = %self.sort_dir);
        TableIntent::Sort {
            column: column.to_owned(),
            direction: self.sort_dir,
        }
    }

    /// Record and forward `page` as requested.
    pub fn on_page_change(&mut self, page: usize) -> TableIntent {
        self.page = page.max(1);
        self.highlighted = None;
        #[cfg(feature = "tracing")]
        tracing::debug!(message = "table.page", page);
        TableIntent::Page(page)
    }

    pub fn on_search_change(&mut self, term: impl Into<String>) -> TableIntent {
        self.search_term = term.into();
        self.highlighted = None;
        TableIntent::Search(self.search_term.clone())
    }
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

/// One column: its key (forwarded in sort intents), header and cell text.
pub struct Column<'a, R> {
    pub key: &'a str,
    pub header: &'a str,
    /// Fixed width; `0` shares the leftover width.
    pub width: u16,
    pub sortable: bool,
    cell: Box<dyn Fn(&R) -> String + 'a>,
}

impl<'a, R> Column<'a, R> {
    pub fn new(key: &'a str, header: &'a str, cell: impl Fn(&R) -> String + 'a) -> Self {
        Self {
            key,
            header,
            width: 0,
            sortable: false,
            cell: Box::new(cell),
        }
    }

    #[must_use]
    pub fn width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    #[must_use]
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn text(&self, row: &R) -> String {
        (self.cell)(row)
    }
}

impl<R> fmt::Debug for Column<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("width", &self.width)
            .field("sortable", &self.sortable)
            .finish_non_exhaustive()
    }
}

/// `(x, width)` of each column inside `area`.
fn layout_columns<R>(columns: &[Column<'_, R>], area: Rect) -> Vec<(u16, u16)> {
    let gaps = COLUMN_GAP.saturating_mul(columns.len().saturating_sub(1) as u16);
    let fixed: u16 = columns.iter().map(|c| c.width).fold(0, u16::saturating_add);
    let flexible = columns.iter().filter(|c| c.width == 0).count() as u16;
    let leftover = area.width.saturating_sub(fixed).saturating_sub(gaps);
    let share = leftover.checked_div(flexible).unwrap_or(0);

    let mut x = area.x;
    columns
        .iter()
        .map(|column| {
            let width = if column.width == 0 { share } else { column.width };
            let width = width.min(area.right().saturating_sub(x));
            let slot = (x, width);
            x = x.saturating_add(width).saturating_add(COLUMN_GAP).min(area.right());
            slot
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ReferenceTable<'a, R> {
    columns: Vec<Column<'a, R>>,
    rows: &'a [R],
    total: usize,
    loading: bool,
    loading_label: String,
    empty_label: String,
    search_placeholder: String,
}

impl<'a, R> ReferenceTable<'a, R> {
    pub fn new(columns: Vec<Column<'a, R>>, rows: &'a [R]) -> Self {
        let config = WidgetConfig::default();
        Self {
            columns,
            rows,
            total: rows.len(),
            loading: false,
            loading_label: config.loading_label,
            empty_label: config.no_records_label,
            search_placeholder: config.search_placeholder,
        }
    }

    #[must_use]
    pub fn config(mut self, config: &WidgetConfig) -> Self {
        self.loading_label.clone_from(&config.loading_label);
        self.empty_label.clone_from(&config.no_records_label);
        self.search_placeholder.clone_from(&config.search_placeholder);
        self
    }

    /// Total records across all pages.
    #[must_use]
    pub fn total(mut self, total: usize) -> Self {
        self.total = total;
        self
    }

    #[must_use]
    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    #[must_use]
    pub fn empty_label(mut self, label: impl Into<String>) -> Self {
        self.empty_label = label.into();
        self
    }

    pub fn columns(&self) -> &[Column<'a, R>] {
        &self.columns
    }

    /// Route an event; pointer presses come with the frame's hit-test result.
    pub fn handle_event(
        &self,
        state: &mut TableState,
        event: &Event,
        hit: Option<(HitId, HitRegion, HitData)>,
    ) -> Option<TableIntent> {
        match event {
            Event::Key(key) if key.is_actionable() => self.handle_key(state, key),
            Event::Paste(paste) if state.search_focused => {
                let mut term = state.search_term.clone();
                term.push_str(&paste.text);
                Some(state.on_search_change(term))
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                let (id, region, data) = hit?;
                if id != state.id {
                    return None;
                }
                self.handle_press(state, region, data)
            }
            _ => None,
        }
    }

    fn handle_press(
        &self,
        state: &mut TableState,
        region: HitRegion,
        data: HitData,
    ) -> Option<TableIntent> {
        match region {
            SEARCH => {
                state.search_focused = true;
                None
            }
            HEADER => {
                let column = self.columns.get(data as usize)?;
                column.sortable.then(|| state.on_sort(column.key))
            }
            ROW => {
                state.search_focused = false;
                let index = data as usize;
                (index < self.rows.len()).then(|| {
                    state.highlighted = Some(index);
                    TableIntent::Activate(index)
                })
            }
            PAGER => self.step_page(state, if data == PREV { -1 } else { 1 }),
            _ => None,
        }
    }

    fn step_page(&self, state: &mut TableState, delta: isize) -> Option<TableIntent> {
        let target = state.page.checked_add_signed(delta)?;
        (target >= 1 && target <= state.page_count(self.total))
            .then(|| state.on_page_change(target))
    }

    fn handle_key(&self, state: &mut TableState, key: &KeyEvent) -> Option<TableIntent> {
        if state.search_focused {
            return match key.code {
                KeyCode::Escape | KeyCode::Enter | KeyCode::Tab => {
                    state.search_focused = false;
                    None
                }
                KeyCode::Backspace => {
                    let mut term = state.search_term.clone();
                    pop_grapheme(&mut term).then(|| state.on_search_change(term))
                }
                _ => {
                    let ch = key.printable()?;
                    let mut term = state.search_term.clone();
                    term.push(ch);
                    Some(state.on_search_change(term))
                }
            };
        }
        let rows = self.rows.len();
        match key.code {
            KeyCode::Char('/') => {
                state.search_focused = true;
                None
            }
            KeyCode::Down if rows > 0 => {
                state.highlighted = Some(state.highlighted.map_or(0, |i| (i + 1).min(rows - 1)));
                None
            }
            KeyCode::Up if rows > 0 => {
                state.highlighted = Some(state.highlighted.map_or(0, |i| i.saturating_sub(1)));
                None
            }
            KeyCode::PageUp => self.step_page(state, -1),
            KeyCode::PageDown => self.step_page(state, 1),
            KeyCode::Enter => state
                .highlighted
                .filter(|&i| i < rows)
                .map(TableIntent::Activate),
            _ => None,
        }
    }

    fn render_search(&self, row: Rect, frame: &mut Frame, state: &TableState) {
        frame.register_hit(row, state.id, SEARCH, 0);
        let label_end = draw_line(&mut frame.buffer, row, "Search: ", Style::new().fg(Color::Muted));
        let text = Rect::new(label_end, row.y, row.right().saturating_sub(label_end), 1);
        let end = if state.search_term.is_empty() {
            draw_line(
                &mut frame.buffer,
                text,
                &self.search_placeholder,
                Style::new().fg(Color::Muted).dim(),
            );
            label_end
        } else {
            draw_line(&mut frame.buffer, text, &state.search_term, Style::new())
        };
        if state.search_focused {
            frame.set_cursor(Some((end.min(row.right().saturating_sub(1)), row.y)));
        }
    }

    fn render_header(&self, row: Rect, frame: &mut Frame, state: &TableState, slots: &[(u16, u16)]) {
        for (index, (column, &(x, width))) in self.columns.iter().zip(slots).enumerate() {
            if width == 0 {
                continue;
            }
            let cell = Rect::new(x, row.y, width, 1);
            let mut header = column.header.to_owned();
            if let Some((key, dir)) = state.sort()
                && key == column.key
            {
                header.push(' ');
                header.push(dir.arrow());
            }
            draw_line(&mut frame.buffer, cell, &header, Style::new().bold());
            if column.sortable {
                frame.register_hit(cell, state.id, HEADER, index as HitData);
            }
        }
    }

    fn render_rows(&self, body: Rect, frame: &mut Frame, state: &TableState, slots: &[(u16, u16)]) {
        let muted = Style::new().fg(Color::Muted);
        if self.loading {
            draw_line(&mut frame.buffer, body, &self.loading_label, muted);
            return;
        }
        if self.rows.is_empty() {
            draw_line(&mut frame.buffer, body, &self.empty_label, muted);
            return;
        }
        for (index, (record, y)) in self.rows.iter().zip(body.y..body.bottom()).enumerate() {
            let line = Rect::new(body.x, y, body.width, 1);
            for (column, &(x, width)) in self.columns.iter().zip(slots) {
                draw_line(
                    &mut frame.buffer,
                    Rect::new(x, y, width, 1),
                    &column.text(record),
                    Style::new(),
                );
            }
            if state.highlighted == Some(index) {
                frame.buffer.set_style(line, Style::new().reverse());
            }
            frame.register_hit(line, state.id, ROW, index as HitData);
        }
    }

    fn render_footer(&self, row: Rect, frame: &mut Frame, state: &TableState) {
        let pages = self.page_count_for(state);
        let status = format!("Page {} of {}", state.page, pages);
        draw_line(&mut frame.buffer, row, &status, Style::new().fg(Color::Muted));

        let next = "Next ›";
        let prev = "‹ Prev";
        let next_w = next.chars().count() as u16;
        let prev_w = prev.chars().count() as u16;
        if row.width < next_w + prev_w + 2 {
            return;
        }
        let next_x = row.right() - next_w;
        let prev_x = next_x - 2 - prev_w;
        let enabled = |on: bool| if on { Style::new() } else { Style::new().dim() };
        frame.buffer.set_string(prev_x, row.y, prev, enabled(state.page > 1), next_x);
        frame.buffer.set_string(next_x, row.y, next, enabled(state.page < pages), row.right());
        frame.register_hit(Rect::new(prev_x, row.y, prev_w, 1), state.id, PAGER, PREV);
        frame.register_hit(Rect::new(next_x, row.y, next_w, 1), state.id, PAGER, NEXT);
    }

    fn page_count_for(&self, state: &TableState) -> usize {
        state.page_count(self.total)
    }
}

impl<R> StatefulWidget for ReferenceTable<'_, R> {
    type State = TableState;

    /// Search row, header, rule, rows, and a footer on the last line.
    fn render(&self, area: Rect, frame: &mut Frame, state: &mut TableState) {
        if area.height < 5 || area.width == 0 {
            return;
        }
        let slots = layout_columns(&self.columns, area);
        let (Some(search), Some(header), Some(rule)) = (area.row(0), area.row(1), area.row(2)) else {
            return;
        };
        self.render_search(search, frame, state);
        self.render_header(header, frame, state, &slots);
        for x in rule.x..rule.right() {
            frame
                .buffer
                .set(x, rule.y, Cell::from_char('─').with_style(Style::new().fg(Color::Muted)));
        }
        let body = Rect::new(area.x, area.y + 3, area.width, area.height - 4);
        self.render_rows(body, frame, state, &slots);
        let footer = Rect::new(area.x, area.bottom() - 1, area.width, 1);
        self.render_footer(footer, frame, state);
    }
}
