use crate::url::normalize::{normalize_url, split_scheme, NormalizedKey};
use crate::UrlError;
use serde::Deserialize;
use std::fmt;

/// How much of the seed address restricts the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScopeMode {
    /// Any address on the seed's host
    #[default]
    Host,
    /// Only addresses on the seed's host at or below the seed's path
    #[serde(alias = "path")]
    PathPrefix,
}

/// The domain a crawl is restricted to
///
/// Derived once from the seed address and fixed for the lifetime of the
/// crawl. Membership is tested on discovered addresses as written, before
/// normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlScope {
    host: String,
    path_prefix: String,
}

impl CrawlScope {
    /// Derives the scope from the seed address
    ///
    /// # Examples
    ///
    /// ```
    /// use ripple_crawl::url::{CrawlScope, ScopeMode};
    ///
    /// let scope = CrawlScope::from_seed("https://test.com/docs", ScopeMode::Host).unwrap();
    /// assert!(scope.contains("https://test.com/hello"));
    /// assert!(!scope.contains("http://other.com/x"));
    ///
    /// let scope = CrawlScope::from_seed("https://test.com/docs", ScopeMode::PathPrefix).unwrap();
    /// assert!(scope.contains("https://test.com/docs/intro"));
    /// assert!(!scope.contains("https://test.com/blog"));
    /// ```
    pub fn from_seed(seed: &str, mode: ScopeMode) -> Result<Self, UrlError> {
        let key = normalize_url(seed)?;
        Ok(Self::from_key(&key, mode))
    }

    /// Builds the scope from an already normalized seed key
    pub fn from_key(key: &NormalizedKey, mode: ScopeMode) -> Self {
        let path_prefix = match mode {
            ScopeMode::Host => String::new(),
            ScopeMode::PathPrefix => key.path().to_string(),
        };

        Self {
            host: key.host().to_string(),
            path_prefix,
        }
    }

    /// Returns true if the address lies inside this scope
    ///
    /// The scheme (if any) is skipped, and the authority, without userinfo
    /// and without the scheme's default port, is compared to the scope host
    /// case-insensitively. When the scope carries a path the address path
    /// must start with it on a segment boundary.
    pub fn contains(&self, address: &str) -> bool {
        let address = address.trim();
        let (scheme, rest) = match split_scheme(address) {
            Some((scheme, rest)) => (scheme, rest),
            None => ("http", address.strip_prefix("//").unwrap_or(address)),
        };

        let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
        let (authority, tail) = rest.split_at(authority_end);

        if !host_part(authority, scheme).eq_ignore_ascii_case(&self.host) {
            return false;
        }

        if self.path_prefix.is_empty() {
            return true;
        }

        match tail.strip_prefix(self.path_prefix.as_str()) {
            Some(after) => after.is_empty() || after.starts_with(['/', '?', '#']),
            None => false,
        }
    }

    /// The host every in-scope address must carry
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The path prefix in-scope addresses must start with, empty for host scope
    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }
}

impl fmt::Display for CrawlScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.host, self.path_prefix)
    }
}

/// Reduces an authority to `host[:port]` as it appears in a key
///
/// Userinfo is dropped, and so is the port when it is the scheme default.
fn host_part<'a>(authority: &'a str, scheme: &str) -> &'a str {
    let host = match authority.rfind('@') {
        Some(idx) => &authority[idx + 1..],
        None => authority,
    };

    let default_port = if scheme.eq_ignore_ascii_case("https") {
        ":443"
    } else if scheme.eq_ignore_ascii_case("http") {
        ":80"
    } else {
        return host;
    };

    host.strip_suffix(default_port).unwrap_or(host)
}
