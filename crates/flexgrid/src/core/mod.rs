//! Core types for the flexgrid layout and render engine.

/// Terminal boundary and control sequences.
pub mod backend;
/// Cooperative cancellation for render passes.
pub mod cancel;
/// Node content and display-index slicing.
pub mod content;
/// Debug dump utilities.
pub mod dump;
/// Core error types.
pub mod error;
/// Node events and listener registries.
pub mod event;
/// Node ID types.
pub mod id;
/// Flex placement.
mod layout;
/// Node data stored in the arena.
pub mod node;
/// Layout and render options.
pub mod options;
/// Incremental rendering.
pub mod render;
/// Resize debouncing.
pub mod resize;
/// Testing utilities.
#[cfg(any(test, feature = "testing"))]
pub mod testing;
/// The node arena and tree operations.
pub mod world;

pub use id::{ListenerId, NodeId};
pub use render::Pass;
pub use resize::ResizeDebouncer;
pub use world::Core;
