//! Run statistics for the dashboard engine.
//!
//! This module tracks what each run did with its input, so callers can
//! report failed or skipped goals alongside the dashboard itself.

pub mod log;

// Re-export commonly used types
pub use log::{RunLog, RunStats};
