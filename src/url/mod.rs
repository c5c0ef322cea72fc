//! URL handling module for Ripple-Crawl
//!
//! This module provides address parsing, normalization into deduplication
//! keys, and the crawl scope that restricts which discovered addresses are
//! followed.

mod normalize;
mod scope;

// Re-export main functions
pub use normalize::{normalize_url, parse_address, NormalizedKey};
pub use scope::{CrawlScope, ScopeMode};
