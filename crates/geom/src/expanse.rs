use super::Rect;

/// An `Expanse` is a size with no location: the dimensions of a display
/// surface in character cells.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Expanse {
    /// Width in columns.
    pub w: u32,
    /// Height in rows.
    pub h: u32,
}

impl Expanse {
    /// Construct an expanse from a width and height.
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    /// Return a `Rect` with the same dimensions as the `Expanse`, anchored at
    /// the origin.
    pub fn rect(&self) -> Rect {
        Rect::new(0, 0, cells(self.h), cells(self.w))
    }
}

impl From<Rect> for Expanse {
    fn from(r: Rect) -> Self {
        Self {
            w: r.width().max(0) as u32,
            h: r.height().max(0) as u32,
        }
    }
}

impl From<(u32, u32)> for Expanse {
    fn from(v: (u32, u32)) -> Self {
        Self { w: v.0, h: v.1 }
    }
}

impl From<(u16, u16)> for Expanse {
    fn from(v: (u16, u16)) -> Self {
        Self {
            w: v.0.into(),
            h: v.1.into(),
        }
    }
}

/// Convert an unsigned cell count into a signed coordinate, saturating.
fn cells(n: u32) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}
