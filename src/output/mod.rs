//! Output module for reporting crawl results
//!
//! This module handles:
//! - Rendering the plain-text visit report
//! - Computing and printing crawl statistics
//! - Writing markdown summaries of a crawl

mod markdown;
mod report;
pub mod stats;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use report::render_report;
pub use stats::{format_statistics, print_statistics, CrawlStatistics};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

