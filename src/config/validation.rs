use crate::config::types::{Config, CrawlSettings, FetcherConfig, OutputConfig};
use crate::ConfigError;

/// Upper bound for the per-request deadline (milliseconds)
pub const MAX_TIMEOUT_MS: u64 = 60_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.timeout_ms == 0 || config.timeout_ms > MAX_TIMEOUT_MS {
        return Err(ConfigError::Validation(format!(
            "timeout-ms must be between 1 and {}, got {}",
            MAX_TIMEOUT_MS, config.timeout_ms
        )));
    }

    validate_user_agent(&config.user_agent)
}

/// The user agent ends up in a request header: printable ASCII only
fn validate_user_agent(user_agent: &str) -> Result<(), ConfigError> {
    if user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if !user_agent
        .chars()
        .all(|c| c.is_ascii() && !c.is_ascii_control())
    {
        return Err(ConfigError::Validation(format!(
            "user-agent must contain only printable ASCII characters, got {:?}",
            user_agent
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if let Some(path) = &config.summary_path {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "summary-path cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates the settings of a single crawl
///
/// Whether the seed is a usable address is decided when the crawl scope is
/// derived from it; here it only has to be present.
pub(crate) fn validate_settings(settings: &CrawlSettings) -> Result<(), ConfigError> {
    if settings.seed.trim().is_empty() {
        return Err(ConfigError::InvalidSeed(
            "seed address cannot be empty".to_string(),
        ));
    }

    if settings.max_concurrency < 1 {
        return Err(ConfigError::Validation(format!(
            "max concurrency must be >= 1, got {}",
            settings.max_concurrency
        )));
    }

    Ok(())
}
