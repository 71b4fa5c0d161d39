//! Example layouts used by flexgrid demos.

/// Sidebar, main pane and status line.
pub mod splits;
