//! Flexgrid: flex layout and incremental rendering for terminal grids.
//!
//! A tree of nodes lives in an arena owned by a [`Core`]. Each node lays its
//! children out along one axis, giving fixed-length children their length and
//! sharing the remaining space among flex children in proportion to their
//! grow weights. Rendering wraps each node's text into its Box and writes
//! cursor-addressed runs to a [`backend::Terminal`], skipping regions the
//! previous pass already left blank.
//!
//! # Module Organization
//!
//! - [`geom`] - Geometry primitives (Rect, Scroll, Expanse, Axis)
//! - [`backend`] - The terminal boundary and a crossterm implementation
//! - [`dump`] - Tree dumps for debugging

#![warn(missing_docs)]

mod core;

pub use ::geom;
#[cfg(any(test, feature = "testing"))]
pub use core::testing;
pub use core::{Core, ListenerId, NodeId, Pass, ResizeDebouncer};
pub use core::{
    backend, cancel, content, dump, error, event, id, node, options, render, resize, world,
};
pub use error::{Error, Result};
