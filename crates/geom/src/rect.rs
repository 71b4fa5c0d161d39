use std::fmt;

use super::{Axis, Scroll};

/// An axis-aligned rectangle described by its four edges, in character
/// cells. Edges are signed and unvalidated: during layout a rectangle can be
/// inverted (right < left or bottom < top), and consumers treat a negative
/// width or height as zero at the point of use.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Rect {
    /// Top edge (inclusive row).
    pub top: i32,
    /// Left edge (inclusive column).
    pub left: i32,
    /// Bottom edge (exclusive row).
    pub bottom: i32,
    /// Right edge (exclusive column).
    pub right: i32,
}

impl Rect {
    /// Construct a rectangle from its edges.
    pub fn new(top: i32, left: i32, bottom: i32, right: i32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Width in columns. May be negative.
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    /// Height in rows. May be negative.
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// True if the rectangle covers no cells.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Size along an axis.
    pub fn extent(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.width(),
            Axis::Vertical => self.height(),
        }
    }

    /// The leading edge along an axis: left for horizontal, top for vertical.
    pub fn leading(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.left,
            Axis::Vertical => self.top,
        }
    }

    /// The trailing edge along an axis: right for horizontal, bottom for
    /// vertical.
    pub fn trailing(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.right,
            Axis::Vertical => self.bottom,
        }
    }

    /// Set the leading edge along an axis.
    pub fn set_leading(&mut self, axis: Axis, v: i32) {
        match axis {
            Axis::Horizontal => self.left = v,
            Axis::Vertical => self.top = v,
        }
    }

    /// Set the trailing edge along an axis.
    pub fn set_trailing(&mut self, axis: Axis, v: i32) {
        match axis {
            Axis::Horizontal => self.right = v,
            Axis::Vertical => self.bottom = v,
        }
    }

    /// Copy both edges along an axis from another rectangle.
    pub fn copy_axis(&mut self, axis: Axis, other: &Self) {
        self.set_leading(axis, other.leading(axis));
        self.set_trailing(axis, other.trailing(axis));
    }

    /// Subtract scroll offsets from the matching edges.
    pub fn scrolled(&self, scroll: Scroll) -> Self {
        Self {
            top: self.top - scroll.top,
            left: self.left - scroll.left,
            bottom: self.bottom - scroll.bottom,
            right: self.right - scroll.right,
        }
    }

    /// Clamp each edge into `outer`. The leading edges can only move forward
    /// and the trailing edges only backward, so the result may be inverted if
    /// this rectangle lies wholly outside `outer`.
    pub fn clamp_to(&self, outer: &Self) -> Self {
        Self {
            top: self.top.max(outer.top),
            left: self.left.max(outer.left),
            bottom: self.bottom.min(outer.bottom),
            right: self.right.min(outer.right),
        }
    }

    /// The overlapping area of two rectangles, or `None` if they share no
    /// cells.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let r = Self {
            top: self.top.max(other.top),
            left: self.left.max(other.left),
            bottom: self.bottom.min(other.bottom),
            right: self.right.min(other.right),
        };
        if r.is_empty() { None } else { Some(r) }
    }

    /// True if every edge of `other` lies within this rectangle's edges.
    pub fn contains(&self, other: &Self) -> bool {
        other.top >= self.top
            && other.left >= self.left
            && other.bottom <= self.bottom
            && other.right <= self.right
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[T: {}, L: {}, B: {}, R: {}]",
            self.top, self.left, self.bottom, self.right
        )
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn dimensions() {
        let r = Rect::new(2, 3, 10, 13);
        assert_eq!(r.width(), 10);
        assert_eq!(r.height(), 8);
        assert_eq!(r.extent(Axis::Horizontal), 10);
        assert_eq!(r.extent(Axis::Vertical), 8);
        assert!(!r.is_empty());
        assert!(Rect::new(5, 5, 4, 10).is_empty());
        assert_eq!(Rect::new(5, 5, 4, 10).height(), -1);
    }

    #[test]
    fn axis_edges() {
        let mut r = Rect::new(1, 2, 3, 4);
        assert_eq!(r.leading(Axis::Horizontal), 2);
        assert_eq!(r.trailing(Axis::Vertical), 3);
        r.set_leading(Axis::Vertical, 0);
        r.set_trailing(Axis::Horizontal, 9);
        assert_eq!(r, Rect::new(0, 2, 3, 9));

        let mut c = Rect::default();
        c.copy_axis(Axis::Vertical, &r);
        assert_eq!(c, Rect::new(0, 0, 3, 0));
        assert_eq!(Axis::Vertical.cross(), Axis::Horizontal);
    }

    #[test]
    fn scroll_then_clamp() {
        let parent = Rect::new(0, 0, 10, 10);
        let r = Rect::new(0, 0, 10, 10).scrolled(Scroll::vertical(3));
        assert_eq!(r, Rect::new(-3, 0, 7, 10));
        assert_eq!(r.clamp_to(&parent), Rect::new(0, 0, 7, 10));

        let wide = Rect::new(0, 5, 10, 30).clamp_to(&parent);
        assert_eq!(wide, Rect::new(0, 5, 10, 10));
        assert!(parent.contains(&wide));
    }

    #[test]
    fn intersection() {
        let a = Rect::new(0, 0, 10, 10);
        assert_eq!(
            a.intersect(&Rect::new(5, 5, 20, 20)),
            Some(Rect::new(5, 5, 10, 10))
        );
        assert_eq!(a.intersect(&Rect::new(10, 0, 20, 10)), None);
        assert_eq!(a.intersect(&Rect::new(2, 2, 2, 8)), None);
    }

    #[test]
    fn display() {
        assert_eq!(
            Rect::new(1, 2, 3, 4).to_string(),
            "[T: 1, L: 2, B: 3, R: 4]"
        );
    }

    fn rect() -> impl Strategy<Value = Rect> {
        (-50i32..50, -50i32..50, -50i32..50, -50i32..50)
            .prop_map(|(t, l, b, r)| Rect::new(t, l, b, r))
    }

    proptest! {
        #[test]
        fn clamped_rect_is_contained(r in rect(), outer in rect()) {
            let c = r.clamp_to(&outer);
            prop_assert!(outer.contains(&c));
        }

        #[test]
        fn intersection_is_contained_in_both(a in rect(), b in rect()) {
            if let Some(i) = a.intersect(&b) {
                prop_assert!(a.contains(&i));
                prop_assert!(b.contains(&i));
                prop_assert!(!i.is_empty());
            }
        }
    }
}
