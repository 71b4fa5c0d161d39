/// Terminal backend utilities for tests.
pub mod backend;
/// Screen decoding for tests.
pub mod grid;
