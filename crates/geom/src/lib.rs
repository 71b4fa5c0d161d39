//! Geometry primitives used across flexgrid.

#![warn(missing_docs)]

/// Width/height size type.
mod expanse;
/// Edge-based rectangle operations.
mod rect;
/// Per-edge scroll offsets.
mod scroll;

pub use expanse::Expanse;
pub use rect::Rect;
pub use scroll::Scroll;

/// The two layout axes.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub enum Axis {
    /// Left to right.
    #[default]
    Horizontal,
    /// Top to bottom.
    Vertical,
}

impl Axis {
    /// The axis perpendicular to this one.
    pub fn cross(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}
