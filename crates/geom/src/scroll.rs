/// Scroll offsets, one per edge. Each offset is subtracted from the matching
/// edge of a laid-out rectangle; setting `top` and `bottom` to the same value
/// shifts a viewport without resizing it.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Scroll {
    /// Offset subtracted from the top edge.
    pub top: i32,
    /// Offset subtracted from the left edge.
    pub left: i32,
    /// Offset subtracted from the bottom edge.
    pub bottom: i32,
    /// Offset subtracted from the right edge.
    pub right: i32,
}

impl Scroll {
    /// Construct scroll offsets for all four edges.
    pub fn new(top: i32, left: i32, bottom: i32, right: i32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Shift vertically by `n` rows without changing height.
    pub fn vertical(n: i32) -> Self {
        Self::new(n, 0, n, 0)
    }

    /// Return true when every offset is zero.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}
