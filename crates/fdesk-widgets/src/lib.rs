#![forbid(unsafe_code)]

//! Widgets for freightdesk reference data.
//!
//! - [`selector`]: searchable single-select over [`SelectOption`]s with a
//!   debounced remote search hook and an "add new" escape hatch.
//! - [`table`]: sortable, paginated, searchable reference table that only
//!   emits intents and never fetches or reorders rows itself.
//! - [`quick_add`]: the quick-add party dialog that answers a selector's
//!   creation request.
//! - [`popover`]: anchored overlay placement used by the selector.
//!
//! Widgets draw into a [`Frame`] and register hit regions so hosts can route
//! pointer presses back with [`Frame::hit_test`].
//!
//! [`SelectOption`]: fdesk_catalog::SelectOption

pub mod popover;
pub mod quick_add;
pub mod selector;
pub mod table;

use fdesk_core::geometry::Rect;
use fdesk_render::buffer::Buffer;
use fdesk_render::cell::{Cell, Style};
use fdesk_render::frame::Frame;

pub use quick_add::{NewParty, QuickAddAction, QuickAddError, QuickAddParty, QuickAddPartyState};
pub use selector::{Selector, SelectorEvent, SelectorLabels, SelectorState};
pub use table::{Column, ReferenceTable, SortDirection, TableIntent, TableState};

/// A widget that renders from, and may update, external state.
pub trait StatefulWidget {
    type State;

    fn render(&self, area: Rect, frame: &mut Frame, state: &mut Self::State);
}

/// Single-line box border.
pub(crate) fn draw_border(buf: &mut Buffer, area: Rect, style: Style) {
    if area.width < 2 || area.height < 2 {
        return;
    }
    let right = area.right() - 1;
    let bottom = area.bottom() - 1;
    let put = |buf: &mut Buffer, x, y, ch| buf.set(x, y, Cell::from_char(ch).with_style(style));
    for x in area.x + 1..right {
        put(buf, x, area.y, '─');
        put(buf, x, bottom, '─');
    }
    for y in area.y + 1..bottom {
        put(buf, area.x, y, '│');
        put(buf, right, y, '│');
    }
    put(buf, area.x, area.y, '┌');
    put(buf, right, area.y, '┐');
    put(buf, area.x, bottom, '└');
    put(buf, right, bottom, '┘');
}

/// Draw `text` on the first line of `area`, clipped to its width.
pub(crate) fn draw_line(buf: &mut Buffer, area: Rect, text: &str, style: Style) -> u16 {
    if area.is_empty() {
        return area.x;
    }
    buf.set_string(area.x, area.y, text, style, area.right())
}

/// Blank out `area` so an overlay hides whatever was drawn beneath it.
pub(crate) fn clear_area(buf: &mut Buffer, area: Rect) {
    buf.fill(area, Cell::from_char(' '));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn border_corners() {
        let mut buf = Buffer::new(4, 3);
        draw_border(&mut buf, Rect::new(0, 0, 4, 3), Style::new());
        assert_eq!(buf.to_lines(), vec!["┌──┐", "│  │", "└──┘"]);
    }

    #[test]
    fn border_skips_degenerate_area() {
        let mut buf = Buffer::new(4, 3);
        draw_border(&mut buf, Rect::new(0, 0, 1, 3), Style::new());
        assert!(buf.to_lines().iter().all(String::is_empty));
    }

    #[test]
    fn draw_line_clips() {
        let mut buf = Buffer::new(10, 1);
        let end = draw_line(&mut buf, Rect::new(2, 0, 4, 1), "Roadways", Style::new());
        assert_eq!(end, 6);
        assert_eq!(buf.row_text(0), "  Road");
    }
}
