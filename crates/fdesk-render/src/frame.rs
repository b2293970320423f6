#![forbid(unsafe_code)]

//! Frame = Buffer + hit grid + cursor for one render pass.
//!
//! Widgets register the cells they own in the [`HitGrid`] while drawing. On
//! the next pointer event the host calls [`Frame::hit_test`] and passes the
//! result to whichever widget state should react. A hit owned by a different
//! [`HitId`] (or no hit at all) is, from a widget's point of view, an outside
//! click.
//!
//! ```
//! use fdesk_core::geometry::Rect;
//! use fdesk_render::frame::{Frame, HitId, HitRegion};
//!
//! let mut frame = Frame::with_hit_grid(20, 4);
//! frame.register_hit(Rect::new(0, 0, 20, 1), HitId::new(7), HitRegion::Content, 0);
//! assert_eq!(frame.hit_test(3, 0), Some((HitId::new(7), HitRegion::Content, 0)));
//! assert_eq!(frame.hit_test(3, 2), None);
//! ```

use crate::buffer::Buffer;
use fdesk_core::geometry::Rect;

/// Identifier for a widget instance in the hit grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct HitId(pub u32);

impl HitId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn id(self) -> u32 {
        self.0
    }
}

/// Opaque per-cell payload; widgets use it for row indices.
pub type HitData = u64;

/// Sub-region of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HitRegion {
    #[default]
    None,
    /// Main content (option rows, table rows).
    Content,
    /// Border or chrome.
    Border,
    /// Clickable button.
    Button,
    /// Widget-defined region tag.
    Custom(u8),
}

/// A single hit cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HitCell {
    pub widget_id: Option<HitId>,
    pub region: HitRegion,
    pub data: HitData,
}

/// Grid mapping cells to the widget that drew them.
#[derive(Debug, Clone)]
pub struct HitGrid {
    width: u16,
    height: u16,
    cells: Vec<HitCell>,
}

impl HitGrid {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![HitCell::default(); width as usize * height as usize],
        }
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    /// Claim every cell of `rect`; later registrations win.
    pub fn register(&mut self, rect: Rect, widget_id: HitId, region: HitRegion, data: HitData) {
        let x_end = (rect.x as usize + rect.width as usize).min(self.width as usize) as u16;
        let y_end = (rect.y as usize + rect.height as usize).min(self.height as usize) as u16;
        let hit = HitCell {
            widget_id: Some(widget_id),
            region,
            data,
        };
        for y in rect.y..y_end {
            for x in rect.x..x_end {
                if let Some(i) = self.index(x, y) {
                    self.cells[i] = hit;
                }
            }
        }
    }

    pub fn hit_test(&self, x: u16, y: u16) -> Option<(HitId, HitRegion, HitData)> {
        let cell = self.index(x, y).map(|i| self.cells[i])?;
        cell.widget_id.map(|id| (id, cell.region, cell.data))
    }

    pub fn clear(&mut self) {
        self.cells.fill(HitCell::default());
    }
}

/// Render target for one pass.
#[derive(Debug, Clone)]
pub struct Frame {
    pub buffer: Buffer,
    /// `Some` when pointer routing is wanted.
    pub hit_grid: Option<HitGrid>,
    /// Where the host should place the text cursor, if anywhere.
    pub cursor_position: Option<(u16, u16)>,
}

impl Frame {
    /// Frame without hit testing.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            buffer: Buffer::new(width, height),
            hit_grid: None,
            cursor_position: None,
        }
    }

    /// Frame with hit testing enabled.
    pub fn with_hit_grid(width: u16, height: u16) -> Self {
        Self {
            buffer: Buffer::new(width, height),
            hit_grid: Some(HitGrid::new(width, height)),
            cursor_position: None,
        }
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.buffer.width()
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.buffer.height()
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.buffer.bounds()
    }

    /// Reset buffer, hit grid, and cursor for the next pass.
    pub fn clear(&mut self) {
        self.buffer.clear();
        if let Some(grid) = self.hit_grid.as_mut() {
            grid.clear();
        }
        self.cursor_position = None;
    }

    #[inline]
    pub fn set_cursor(&mut self, position: Option<(u16, u16)>) {
        self.cursor_position = position;
    }

    /// Register a hit region; returns `false` when hit testing is off.
    pub fn register_hit(&mut self, rect: Rect, id: HitId, region: HitRegion, data: HitData) -> bool {
        match self.hit_grid.as_mut() {
            Some(grid) => {
                grid.register(rect, id, region, data);
                true
            }
            None => false,
        }
    }

    pub fn hit_test(&self, x: u16, y: u16) -> Option<(HitId, HitRegion, HitData)> {
        self.hit_grid.as_ref().and_then(|grid| grid.hit_test(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    #[test]
    fn frame_without_grid_ignores_hits() {
        let mut frame = Frame::new(4, 4);
        assert!(!frame.register_hit(Rect::new(0, 0, 4, 4), HitId::new(1), HitRegion::Content, 0));
        assert_eq!(frame.hit_test(1, 1), None);
    }

    #[test]
    fn later_registration_wins() {
        let mut frame = Frame::with_hit_grid(10, 1);
        frame.register_hit(Rect::new(0, 0, 10, 1), HitId::new(1), HitRegion::Custom(1), 0);
        frame.register_hit(Rect::new(6, 0, 1, 1), HitId::new(1), HitRegion::Button, 0);
        assert_eq!(frame.hit_test(5, 0), Some((HitId::new(1), HitRegion::Custom(1), 0)));
        assert_eq!(frame.hit_test(6, 0), Some((HitId::new(1), HitRegion::Button, 0)));
    }

    #[test]
    fn clear_resets_everything() {
        let mut frame = Frame::with_hit_grid(5, 5);
        frame.buffer.set(2, 2, Cell::from_char('X'));
        frame.register_hit(Rect::new(0, 0, 5, 5), HitId::new(9), HitRegion::Content, 3);
        frame.set_cursor(Some((1, 1)));
        frame.clear();
        assert!(frame.buffer.get(2, 2).is_some_and(Cell::is_empty));
        assert_eq!(frame.hit_test(2, 2), None);
        assert_eq!(frame.cursor_position, None);
    }

    #[test]
    fn registration_clips_to_grid() {
        let mut grid = HitGrid::new(3, 3);
        grid.register(Rect::new(2, 2, 50, 50), HitId::new(4), HitRegion::Content, 1);
        assert_eq!(grid.hit_test(2, 2), Some((HitId::new(4), HitRegion::Content, 1)));
        assert_eq!(grid.hit_test(3, 3), None);
    }
}
