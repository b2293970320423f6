#![forbid(unsafe_code)]

//! Fixed-size cell grid.
//!
//! # Invariants
//!
//! - `cells.len() == width * height`, row-major.
//! - A double-width character occupies its cell plus a
//!   [`CellContent::Continuation`] cell to the right; it is never written if
//!   only one column remains.
//! - Multi-codepoint grapheme clusters are stored by their base character.

use crate::cell::{Cell, CellContent, Style};
use fdesk_core::geometry::Rect;
use fdesk_core::text_width::grapheme_width;
use unicode_segmentation::UnicodeSegmentation;

/// A 2D grid of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Buffer {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width as usize * height as usize],
        }
    }

    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    pub const fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        self.index(x, y).map(|i| &mut self.cells[i])
    }

    /// Overwrite one cell; out-of-bounds writes are dropped.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(slot) = self.get_mut(x, y) {
            *slot = cell;
        }
    }

    /// Reset every cell.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Fill `area` (clipped to the buffer) with `cell`.
    pub fn fill(&mut self, area: Rect, cell: Cell) {
        let area = area.intersection(&self.bounds());
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                self.set(x, y, cell);
            }
        }
    }

    /// Layer `style` over every cell in `area`.
    pub fn set_style(&mut self, area: Rect, style: Style) {
        if style.is_empty() {
            return;
        }
        let area = area.intersection(&self.bounds());
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                if let Some(cell) = self.get_mut(x, y) {
                    cell.apply_style(style);
                }
            }
        }
    }

    /// Draw `text` starting at `(x, y)`, stopping at `max_x` (exclusive).
    ///
    /// Returns the column after the last drawn cell.
    pub fn set_string(&mut self, x: u16, y: u16, text: &str, style: Style, max_x: u16) -> u16 {
        let max_x = max_x.min(self.width);
        if y >= self.height {
            return x;
        }
        let mut col = x;
        for grapheme in text.graphemes(true) {
            let w = grapheme_width(grapheme) as u16;
            if w == 0 {
                continue;
            }
            if col.saturating_add(w) > max_x {
                break;
            }
            let Some(base) = grapheme.chars().next() else {
                continue;
            };
            self.set(col, y, Cell::from_char(base).with_style(style));
            if w == 2 {
                let mut tail = Cell::default().with_style(style);
                tail.content = CellContent::Continuation;
                self.set(col + 1, y, tail);
            }
            col += w;
        }
        col
    }

    /// Text of row `y` with trailing blanks trimmed. Empty cells read as spaces.
    pub fn row_text(&self, y: u16) -> String {
        let mut out = String::with_capacity(self.width as usize);
        for x in 0..self.width {
            match self.get(x, y).map(|c| c.content) {
                Some(CellContent::Char(c)) => out.push(c),
                Some(CellContent::Continuation) => {}
                _ => out.push(' '),
            }
        }
        out.truncate(out.trim_end().len());
        out
    }

    /// All rows as text, for snapshots and plain-text presentation.
    pub fn to_lines(&self) -> Vec<String> {
        (0..self.height).map(|y| self.row_text(y)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Color, StyleFlags};

    #[test]
    fn set_string_clips_at_max_x() {
        let mut buf = Buffer::new(10, 1);
        let end = buf.set_string(0, 0, "Seaways cargo", Style::new(), 7);
        assert_eq!(end, 7);
        assert_eq!(buf.row_text(0), "Seaways");
    }

    #[test]
    fn wide_char_needs_two_columns() {
        let mut buf = Buffer::new(3, 1);
        let end = buf.set_string(0, 0, "東京", Style::new(), 3);
        assert_eq!(end, 2);
        assert_eq!(buf.get(1, 0).map(|c| c.content), Some(CellContent::Continuation));
        assert_eq!(buf.row_text(0), "東");
    }

    #[test]
    fn set_style_layers_attributes() {
        let mut buf = Buffer::new(4, 1);
        buf.set_string(0, 0, "ab", Style::new().bold(), 4);
        buf.set_style(Rect::new(0, 0, 4, 1), Style::new().fg(Color::Accent));
        let cell = buf.get(0, 0).copied().unwrap_or_default();
        assert!(cell.attrs.contains(StyleFlags::BOLD));
        assert_eq!(cell.fg, Color::Accent);
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut buf = Buffer::new(2, 2);
        buf.set(5, 5, Cell::from_char('x'));
        buf.fill(Rect::new(1, 1, 10, 10), Cell::from_char('#'));
        assert_eq!(buf.to_lines(), vec!["".to_string(), " #".to_string()]);
    }
}
