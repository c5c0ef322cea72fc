//! Configuration module for Ripple-Crawl
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file, and the per-run [`CrawlSettings`].
//!
//! # Example
//!
//! ```no_run
//! use ripple_crawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("ripple.toml")).unwrap();
//! println!("Fetch deadline: {}ms", config.fetcher.timeout_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlSettings, CrawlerConfig, FetcherConfig, OutputConfig, DEFAULT_PROGRESS_INTERVAL,
    DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

pub use validation::{validate, MAX_TIMEOUT_MS};
