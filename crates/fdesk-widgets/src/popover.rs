#![forbid(unsafe_code)]

//! Anchored overlay placement.
//!
//! A [`Popover`] floats a panel directly above or below an anchor rectangle,
//! such as a selector's trigger row. It flips to the other side when the
//! preferred side is too short, and otherwise shrinks to what fits.
//!
//! ```
//! use fdesk_core::geometry::Rect;
//! use fdesk_widgets::popover::{Placement, Popover};
//!
//! let anchor = Rect::new(2, 18, 20, 1);
//! let area = Popover::new(anchor, Placement::Below)
//!     .height(6)
//!     .bordered(true)
//!     .compute_area(Rect::from_size(40, 20))
//!     .unwrap();
//! // Not enough room below row 18, so it opens upwards.
//! assert_eq!(area, Rect::new(2, 10, 20, 8));
//! ```

use crate::{clear_area, draw_border};
use fdesk_core::geometry::{Rect, Sides};
use fdesk_render::cell::Style;
use fdesk_render::frame::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    Above,
    #[default]
    Below,
}

impl Placement {
    fn flip(self) -> Self {
        match self {
            Self::Above => Self::Below,
            Self::Below => Self::Above,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Popover {
    pub anchor: Rect,
    pub placement: Placement,
    /// Content width; the anchor's width when `None`.
    pub width: Option<u16>,
    /// Wanted content height, excluding border.
    pub height: u16,
    pub bordered: bool,
    pub auto_flip: bool,
    pub border_style: Style,
}

impl Popover {
    pub fn new(anchor: Rect, placement: Placement) -> Self {
        Self {
            anchor,
            placement,
            width: None,
            height: 1,
            bordered: false,
            auto_flip: true,
            border_style: Style::new(),
        }
    }

    #[must_use]
    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    #[must_use]
    pub fn height(mut self, height: u16) -> Self {
        self.height = height;
        self
    }

    #[must_use]
    pub fn bordered(mut self, bordered: bool) -> Self {
        self.bordered = bordered;
        self
    }

    #[must_use]
    pub fn auto_flip(mut self, auto_flip: bool) -> Self {
        self.auto_flip = auto_flip;
        self
    }

    #[must_use]
    pub fn border_style(mut self, style: Style) -> Self {
        self.border_style = style;
        self
    }

    fn overhead(&self) -> u16 {
        if self.bordered { 2 } else { 0 }
    }

    fn space(&self, placement: Placement, viewport: Rect) -> u16 {
        match placement {
            Placement::Above => self.anchor.y.saturating_sub(viewport.y),
            Placement::Below => viewport.bottom().saturating_sub(self.anchor.bottom()),
        }
    }

    fn resolve(&self, viewport: Rect, needed: u16) -> Placement {
        let primary = self.placement;
        let available = self.space(primary, viewport);
        if !self.auto_flip || available >= needed {
            return primary;
        }
        let flipped = primary.flip();
        let flipped_available = self.space(flipped, viewport);
        if flipped_available >= needed || flipped_available > available {
            flipped
        } else {
            primary
        }
    }

    /// Outer area (border included) inside `viewport`, or `None` if nothing
    /// fits.
    pub fn compute_area(&self, viewport: Rect) -> Option<Rect> {
        let overhead = self.overhead();
        let width = self
            .width
            .unwrap_or(self.anchor.width)
            .saturating_add(if self.width.is_some() { overhead } else { 0 })
            .min(viewport.width);
        let needed = self.height.saturating_add(overhead);
        let placement = self.resolve(viewport, needed);
        let height = needed.min(self.space(placement, viewport));
        if width == 0 || height <= overhead {
            return None;
        }
        let max_x = viewport.right().saturating_sub(width);
        let x = self.anchor.x.clamp(viewport.x, max_x.max(viewport.x));
        let y = match placement {
            Placement::Below => self.anchor.bottom(),
            Placement::Above => self.anchor.y - height,
        };
        Some(Rect::new(x, y, width, height))
    }

    /// Clear the popover area, draw the border if any, and hand the inner
    /// area to `content`. Returns the outer area that was used.
    pub fn render_with<F>(&self, viewport: Rect, frame: &mut Frame, content: F) -> Option<Rect>
    where
        F: FnOnce(Rect, &mut Frame),
    {
        let area = self.compute_area(viewport)?;
        clear_area(&mut frame.buffer, area);
        let inner = if self.bordered {
            draw_border(&mut frame.buffer, area, self.border_style);
            area.inner(Sides::all(1))
        } else {
            area
        };
        content(inner, frame);
        Some(area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Rect = Rect::from_size(40, 20);

    #[test]
    fn below_when_room() {
        let area = Popover::new(Rect::new(0, 2, 10, 1), Placement::Below)
            .height(4)
            .compute_area(VIEW);
        assert_eq!(area, Some(Rect::new(0, 3, 10, 4)));
    }

    #[test]
    fn shrinks_when_neither_side_fits() {
        let area = Popover::new(Rect::new(0, 3, 10, 1), Placement::Below)
            .height(30)
            .compute_area(Rect::from_size(40, 8));
        // 4 rows below beats 3 above.
        assert_eq!(area, Some(Rect::new(0, 4, 10, 4)));
    }

    #[test]
    fn no_flip_when_disabled() {
        let area = Popover::new(Rect::new(0, 18, 10, 1), Placement::Below)
            .height(5)
            .auto_flip(false)
            .compute_area(VIEW);
        assert_eq!(area, Some(Rect::new(0, 19, 10, 1)));
    }

    #[test]
    fn border_only_is_none() {
        let area = Popover::new(Rect::new(0, 18, 10, 1), Placement::Below)
            .bordered(true)
            .auto_flip(false)
            .compute_area(VIEW);
        assert_eq!(area, None);
    }

    #[test]
    fn x_clamped_into_viewport() {
        let area = Popover::new(Rect::new(35, 0, 2, 1), Placement::Below)
            .width(10)
            .compute_area(VIEW)
            .unwrap();
        assert_eq!(area.x, 30);
        assert_eq!(area.width, 10);
    }

    #[test]
    fn render_with_passes_inner_area() {
        let mut frame = Frame::new(20, 10);
        let mut seen = None;
        let outer = Popover::new(Rect::new(0, 0, 8, 1), Placement::Below)
            .height(2)
            .bordered(true)
            .render_with(frame.bounds(), &mut frame, |inner, _| seen = Some(inner));
        assert_eq!(outer, Some(Rect::new(0, 1, 8, 4)));
        assert_eq!(seen, Some(Rect::new(1, 2, 6, 2)));
        assert_eq!(frame.buffer.row_text(1), "┌──────┐");
    }
}
