//! State module for tracking crawl progress
//!
//! This module provides the work unit lifecycle and the counters that record
//! how each unit ended.
//!
//! # Components
//!
//! - `UnitState`: Lifecycle of a single work unit (pending, claimed, fetching, processed, ...)
//! - `OutcomeTally`: Concurrent counters of terminal unit states

mod tally;
mod unit_state;

// Re-export main types
pub use tally::OutcomeTally;
pub use unit_state::UnitState;
