//! Ripple-Crawl: a bounded single-domain web crawler
//!
//! This crate crawls every page reachable from a seed address within the
//! seed's domain, fetching each distinct page at most once, never more than
//! a fixed page budget, and never more than a fixed number at a time.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

pub use crawler::FetchError;
pub use output::OutputError;

/// Main error type for Ripple-Crawl operations
#[derive(Debug, Error)]
pub enum RippleError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Malformed address {address}: {source}")]
    MalformedAddress { address: String, source: UrlError },

    #[error("Unparsable document at {address}: {message}")]
    UnparsableDocument { address: String, message: String },

    #[error("Fetch failed for {address}: {source}")]
    Fetch { address: String, source: FetchError },

    #[error("No fetch permit available for {address}")]
    PermitUnavailable { address: String },

    #[error("Crawl cancelled while processing {address}")]
    Cancelled { address: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid seed address: {0}")]
    InvalidSeed(String),
}

/// URL-specific errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Empty address")]
    Empty,
}

/// Result type alias for Ripple-Crawl operations
pub type Result<T> = std::result::Result<T, RippleError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, Coordinator, CrawlOutcome, CrawlSettings};
pub use state::UnitState;
pub use url::{normalize_url, CrawlScope, NormalizedKey, ScopeMode};
