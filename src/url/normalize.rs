use crate::UrlError;
use std::borrow::Borrow;
use std::fmt;
use url::Url;

/// Scheme assumed for addresses written without one (`hello.com/path`)
const DEFAULT_SCHEME: &str = "http";

/// Canonical deduplication identity of an address
///
/// Two addresses refer to the same page iff their keys are equal. A key is
/// the lowercase host (with the port when it is not the scheme default)
/// followed by the path, with trailing slashes removed. Scheme, query and
/// fragment are not part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the host portion of the key (everything before the first `/`)
    pub fn host(&self) -> &str {
        match self.0.find('/') {
            Some(idx) => &self.0[..idx],
            None => &self.0,
        }
    }

    /// Returns the path portion of the key, empty for a bare host
    pub fn path(&self) -> &str {
        &self.0[self.host().len()..]
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NormalizedKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NormalizedKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Parses an address into an absolute HTTP(S) URL
///
/// Addresses without a scheme (`example.com/page`) and protocol-relative
/// addresses (`//example.com/page`) are read as `http://`. A bare path
/// (`/page`) has no host and is rejected.
///
/// # Examples
///
/// ```
/// use ripple_crawl::url::parse_address;
///
/// let url = parse_address("example.com/page").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/page");
/// ```
pub fn parse_address(address: &str) -> Result<Url, UrlError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(UrlError::Empty);
    }

    let parsed = if let Some(rest) = address.strip_prefix("//") {
        Url::parse(&format!("{}://{}", DEFAULT_SCHEME, rest))
    } else if address.starts_with('/') {
        return Err(UrlError::MissingDomain);
    } else if split_scheme(address).is_some() {
        Url::parse(address)
    } else {
        // "localhost:8080/x" would otherwise parse with scheme "localhost"
        Url::parse(&format!("{}://{}", DEFAULT_SCHEME, address))
    };
    let url = parsed.map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingDomain),
    }
}

/// Splits a leading `scheme://` off an address
///
/// Only the text before the first `://` is considered, and only when it is
/// a syntactically valid scheme (an ASCII letter followed by alphanumerics,
/// `+`, `-` or `.`). A `://` inside a path or query is not a scheme.
pub(crate) fn split_scheme(address: &str) -> Option<(&str, &str)> {
    let idx = address.find("://")?;
    let scheme = &address[..idx];

    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));

    valid.then(|| (scheme, &address[idx + 3..]))
}

/// Normalizes an address into its deduplication key
///
/// # Normalization Steps
///
/// 1. Parse the address (see [`parse_address`]); reject if malformed
/// 2. Keep the lowercase host, plus the port when it is not the default
/// 3. Append the path and strip every trailing slash
/// 4. Drop scheme, query and fragment
///
/// The function is pure and idempotent: normalizing a key yields the same
/// key again.
///
/// # Examples
///
/// ```
/// use ripple_crawl::url::normalize_url;
///
/// let key = normalize_url("https://Blog.Boot.dev/path/").unwrap();
/// assert_eq!(key.as_str(), "blog.boot.dev/path");
/// assert_eq!(normalize_url(key.as_str()).unwrap(), key);
/// ```
pub fn normalize_url(address: &str) -> Result<NormalizedKey, UrlError> {
    let url = parse_address(address)?;
    // parse_address guarantees a host
    let host = url.host_str().unwrap_or_default();

    let mut key = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    key.push_str(url.path());

    let trimmed_len = key.trim_end_matches('/').len();
    key.truncate(trimmed_len);

    Ok(NormalizedKey(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(address: &str) -> String {
        normalize_url(address).unwrap().into_string()
    }

    #[test]
    fn test_remove_scheme() {
        assert_eq!(key("https://blog.boot.dev/path"), "blog.boot.dev/path");
    }

    #[test]
    fn test_multi_path() {
        assert_eq!(
            key("http://myurl.com/multi/path/hello"),
            "myurl.com/multi/path/hello"
        );
    }

    #[test]
    fn test_extraneous_slashes_removed() {
        assert_eq!(key("http://hello.com/test/////"), "hello.com/test");
    }

    #[test]
    fn test_no_path() {
        assert_eq!(key("http://hello.com"), "hello.com");
        assert_eq!(key("http://hello.com/"), "hello.com");
    }

    #[test]
    fn test_no_scheme() {
        assert_eq!(key("hello.com/path"), "hello.com/path");
    }

    #[test]
    fn test_no_scheme_with_embedded_url() {
        assert_eq!(
            key("test.com/login?next=http://test.com/home"),
            "test.com/login"
        );
        assert_eq!(
            key("test.com/redirect/http://other.com/x"),
            "test.com/redirect/http://other.com/x"
        );
    }

    #[test]
    fn test_embedded_url_stays_in_path() {
        assert_eq!(
            key("https://test.com/redirect/http://other.com/x"),
            "test.com/redirect/http://other.com/x"
        );
    }

    #[test]
    fn test_split_scheme() {
        assert_eq!(
            split_scheme("https://test.com/a"),
            Some(("https", "test.com/a"))
        );
        assert_eq!(split_scheme("svn+ssh://host"), Some(("svn+ssh", "host")));
        assert_eq!(split_scheme("test.com/x?u=http://y"), None);
        assert_eq!(split_scheme("1http://test.com"), None);
        assert_eq!(split_scheme("://test.com"), None);
        assert_eq!(split_scheme("test.com"), None);
    }

    #[test]
    fn test_with_port() {
        assert_eq!(key("http://localhost:8080/path"), "localhost:8080/path");
        assert_eq!(key("localhost:8080/path"), "localhost:8080/path");
    }

    #[test]
    fn test_default_port_dropped() {
        assert_eq!(key("https://example.com:443/page"), "example.com/page");
        assert_eq!(key("http://example.com:80/page"), "example.com/page");
    }

    #[test]
    fn test_scheme_does_not_matter() {
        assert_eq!(key("http://example.com/a"), key("https://example.com/a"));
    }

    #[test]
    fn test_lowercase_host_keeps_path_case() {
        assert_eq!(key("https://EXAMPLE.COM/Page"), "example.com/Page");
    }

    #[test]
    fn test_query_and_fragment_dropped() {
        assert_eq!(key("https://example.com/page?b=2&a=1"), "example.com/page");
        assert_eq!(key("https://example.com/page#section"), "example.com/page");
        assert_eq!(key("https://example.com/page/?x=1#y"), "example.com/page");
    }

    #[test]
    fn test_trailing_slash_variants_collide() {
        assert_eq!(key("https://test.com/a"), key("https://test.com/a/"));
    }

    #[test]
    fn test_protocol_relative() {
        assert_eq!(key("//cdn.example.com/lib"), "cdn.example.com/lib");
    }

    #[test]
    fn test_idempotent() {
        for address in [
            "https://blog.boot.dev/path",
            "http://hello.com/test/////",
            "http://hello.com",
            "hello.com/path",
            "http://localhost:8080/path",
            "https://EXAMPLE.com/a/b/?q=1#frag",
            "http://[::1]:3000/x/",
            "https://example.com/caf%C3%A9/",
            "https://test.com/redirect/http://other.com/x",
            "test.com/login?next=http://test.com/home",
        ] {
            let once = normalize_url(address).unwrap();
            let twice = normalize_url(once.as_str()).unwrap();
            assert_eq!(once, twice, "not idempotent for {}", address);
        }
    }

    #[test]
    fn test_host_and_path_accessors() {
        let k = normalize_url("https://test.com/blog/post").unwrap();
        assert_eq!(k.host(), "test.com");
        assert_eq!(k.path(), "/blog/post");

        let bare = normalize_url("https://test.com").unwrap();
        assert_eq!(bare.host(), "test.com");
        assert_eq!(bare.path(), "");
    }

    #[test]
    fn test_empty_address() {
        assert_eq!(normalize_url(""), Err(UrlError::Empty));
        assert_eq!(normalize_url("   "), Err(UrlError::Empty));
    }

    #[test]
    fn test_bare_path_rejected() {
        assert_eq!(normalize_url("/hello"), Err(UrlError::MissingDomain));
    }

    #[test]
    fn test_invalid_scheme() {
        assert!(matches!(
            normalize_url("ftp://example.com/page"),
            Err(UrlError::InvalidScheme(_))
        ));
        assert!(matches!(
            normalize_url("mailto://someone@example.com"),
            Err(UrlError::InvalidScheme(_))
        ));
    }

    #[test]
    fn test_malformed_url() {
        assert!(normalize_url("http://exa mple.com").is_err());
        assert!(normalize_url("http://").is_err());
    }
}
