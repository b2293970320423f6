#![forbid(unsafe_code)]

//! Geometric primitives in cell space.

/// A rectangle for layout bounds and hit testing.
///
/// Uses cell coordinates (0-indexed, origin at top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    #[inline]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle anchored at the origin.
    #[inline]
    pub const fn from_size(width: u16, height: u16) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub const fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Overlap with `other`, or an empty rect at the origin.
    pub fn intersection(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= x || bottom <= y {
            return Rect::default();
        }
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Shrink by `margin` on each side, saturating at zero size.
    pub fn inner(&self, margin: Sides) -> Rect {
        Rect {
            x: self.x.saturating_add(margin.left),
            y: self.y.saturating_add(margin.top),
            width: self
                .width
                .saturating_sub(margin.left)
                .saturating_sub(margin.right),
            height: self
                .height
                .saturating_sub(margin.top)
                .saturating_sub(margin.bottom),
        }
    }

    /// The single row at `offset` from the top, if it lies inside.
    pub fn row(&self, offset: u16) -> Option<Rect> {
        (offset < self.height).then(|| Rect::new(self.x, self.y + offset, self.width, 1))
    }
}

/// Per-side margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sides {
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
    pub left: u16,
}

impl Sides {
    pub const fn all(n: u16) -> Self {
        Self {
            top: n,
            right: n,
            bottom: n,
            left: n,
        }
    }

    pub const fn horizontal(n: u16) -> Self {
        Self {
            top: 0,
            right: n,
            bottom: 0,
            left: n,
        }
    }
}

impl From<u16> for Sides {
    fn from(n: u16) -> Self {
        Self::all(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open() {
        let r = Rect::new(2, 2, 3, 2);
        assert!(r.contains(2, 2));
        assert!(r.contains(4, 3));
        assert!(!r.contains(5, 3));
        assert!(!r.contains(4, 4));
    }

    #[test]
    fn intersection_of_disjoint_rects_is_empty() {
        let a = Rect::new(0, 0, 2, 2);
        let b = Rect::new(5, 5, 2, 2);
        assert!(a.intersection(&b).is_empty());
    }

    #[test]
    fn intersection_clips_overlap() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 2, 10, 3);
        assert_eq!(a.intersection(&b), Rect::new(5, 2, 5, 3));
    }

    #[test]
    fn inner_saturates() {
        let r = Rect::new(0, 0, 3, 1);
        let inner = r.inner(Sides::all(1));
        assert_eq!(inner.width, 1);
        assert_eq!(inner.height, 0);
        assert!(inner.is_empty());
    }

    #[test]
    fn row_outside_height_is_none() {
        let r = Rect::new(1, 1, 4, 2);
        assert_eq!(r.row(1), Some(Rect::new(1, 2, 4, 1)));
        assert_eq!(r.row(2), None);
    }
}
