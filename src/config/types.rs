use crate::url::ScopeMode;
use serde::Deserialize;

/// Default per-request deadline (milliseconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 1500;

/// Default `User-Agent` header
pub const DEFAULT_USER_AGENT: &str = concat!("ripple-crawl/", env!("CARGO_PKG_VERSION"));

/// Default number of fetched pages between progress log lines
pub const DEFAULT_PROGRESS_INTERVAL: usize = 10;

/// Main configuration structure for Ripple-Crawl
///
/// Every section is optional; a missing file section takes its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub fetcher: FetcherConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Whether the crawl is restricted to the seed's host or its path
    pub scope: ScopeMode,

    /// Log a progress line every N fetched pages (0 disables)
    #[serde(rename = "progress-interval")]
    pub progress_interval: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            scope: ScopeMode::Host,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// HTTP fetcher configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Deadline for a whole request, connect included (milliseconds)
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Value of the `User-Agent` header
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the markdown summary file; no summary is written when unset
    #[serde(rename = "summary-path")]
    pub summary_path: Option<String>,
}

/// Parameters of a single crawl run
///
/// Built from the command line, optionally merged with a [`CrawlerConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSettings {
    /// Address the crawl starts from; also defines its scope
    pub seed: String,

    /// Maximum number of fetches in flight at once
    pub max_concurrency: usize,

    /// Maximum number of distinct pages fetched
    pub max_pages: usize,

    pub scope: ScopeMode,

    /// Log a progress line every N fetched pages (0 disables)
    pub progress_interval: usize,
}

impl CrawlSettings {
    pub fn new(seed: impl Into<String>, max_concurrency: usize, max_pages: usize) -> Self {
        Self {
            seed: seed.into(),
            max_concurrency,
            max_pages,
            scope: ScopeMode::Host,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Takes scope and progress reporting from the crawler configuration
    pub fn with_crawler_config(mut self, config: &CrawlerConfig) -> Self {
        self.scope = config.scope;
        self.progress_interval = config.progress_interval;
        self
    }

    /// Checks the settings before a crawl is started
    pub fn validate(&self) -> Result<(), crate::ConfigError> {
        crate::config::validation::validate_settings(self)
    }
}
