//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and deadline
//! - GET requests to fetch page content
//! - Error classification (4xx, 5xx, content type, timeout, transport)
//!
//! There are no retries: every failure is terminal for the page that hit it.

use crate::config::FetcherConfig;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;

/// Content types accepted as markup documents
const MARKUP_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// Maximum redirect hops the transport follows on its own
const MAX_REDIRECTS: usize = 10;

/// Classified fetch failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("client error (HTTP {0})")]
    ClientError(u16),

    #[error("server error (HTTP {0})")]
    ServerError(u16),

    #[error("wrong content type: {0:?}")]
    WrongContentType(String),

    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),
}

/// Retrieves documents for the crawler
///
/// Implementations must be safe to call from many workers at once and must
/// bound the time each call takes.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `address` and returns the document body
    async fn fetch(&self, address: &str) -> Result<String, FetchError>;
}

/// [`Fetcher`] backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Wraps an already configured client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher from the fetcher configuration
    pub fn from_config(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        build_http_client(config).map(Self::new)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, address: &str) -> Result<String, FetchError> {
        fetch_url(&self.client, address).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetcher configuration (user agent and per-request deadline)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use ripple_crawl::config::FetcherConfig;
/// use ripple_crawl::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_millis(config.timeout_ms);

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the outcome
///
/// # Classification
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with markup Content-Type | `Ok(body)` |
/// | 2xx with any other Content-Type | `WrongContentType` |
/// | HTTP 4xx | `ClientError(code)` |
/// | HTTP 5xx | `ServerError(code)` (not retried) |
/// | Deadline exceeded | `Timeout` |
/// | Connection refused, DNS, TLS, too many redirects | `Transport` |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The absolute URL to fetch
pub async fn fetch_url(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client.get(url).send().await.map_err(classify_error)?;
    let status = response.status();

    if status.is_client_error() {
        return Err(FetchError::ClientError(status.as_u16()));
    }

    if status.is_server_error() {
        return Err(FetchError::ServerError(status.as_u16()));
    }

    if !status.is_success() {
        return Err(FetchError::Transport(format!(
            "unexpected status {}",
            status.as_u16()
        )));
    }

    // Check Content-Type
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_markup(&content_type) {
        return Err(FetchError::WrongContentType(content_type));
    }

    response.text().await.map_err(classify_error)
}

/// Returns true if a Content-Type header denotes a markup document
pub fn is_markup(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    MARKUP_CONTENT_TYPES.contains(&mime.as_str())
}

fn classify_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_connect() {
        FetchError::Transport(format!("connection failed: {}", error))
    } else if error.is_redirect() {
        FetchError::Transport(format!("redirect error: {}", error))
    } else {
        FetchError::Transport(error.to_string())
    }
}
