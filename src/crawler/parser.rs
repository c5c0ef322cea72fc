//! HTML parser for extracting links
//!
//! This module walks a parsed document and collects the targets of its
//! hyperlinks as absolute addresses, in document order.

use crate::url::parse_address;
use crate::RippleError;
use scraper::Html;
use url::Url;

/// Extracts every hyperlink target from an HTML document
///
/// # Link Extraction Rules
///
/// - Every `<a>` element anywhere in the tree is visited exactly once
/// - Missing or empty (after trimming) `href` attributes are skipped
/// - A fully qualified `href` (`https://host/...`) is returned unchanged
/// - Any other `href` is resolved against `base_address` (relative path,
///   absolute path, protocol-relative)
/// - Targets that are not HTTP(S) (`mailto:`, `javascript:`, `data:`, ...)
///   are skipped
///
/// The tree is walked depth-first with an explicit stack, so deeply nested
/// documents cost heap memory proportional to the tree width rather than
/// call-stack depth.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_address` - The address the document was fetched from
///
/// # Returns
///
/// * `Ok(Vec<String>)` - Absolute addresses in document order
/// * `Err(RippleError::UnparsableDocument)` - The base address cannot anchor
///   relative links
///
/// # Example
///
/// ```
/// use ripple_crawl::crawler::extract_links;
///
/// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
/// let links = extract_links(html, "https://example.com/").unwrap();
/// assert_eq!(links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn extract_links(html: &str, base_address: &str) -> Result<Vec<String>, RippleError> {
    let base = parse_address(base_address).map_err(|e| RippleError::UnparsableDocument {
        address: base_address.to_string(),
        message: format!("invalid base address: {}", e),
    })?;

    let document = Html::parse_document(html);
    if !document.errors.is_empty() {
        tracing::trace!(
            "{} recoverable markup errors in {}",
            document.errors.len(),
            base_address
        );
    }

    let mut links = Vec::new();
    let mut stack = vec![document.tree.root()];

    while let Some(node) = stack.pop() {
        if let Some(element) = node.value().as_element() {
            if element.name().eq_ignore_ascii_case("a") {
                if let Some(link) = element
                    .attr("href")
                    .and_then(|href| resolve_link(href, &base))
                {
                    links.push(link);
                }
            }
        }

        // Push children last-to-first so the first child is visited next
        let mut child = node.last_child();
        while let Some(current) = child {
            stack.push(current);
            child = current.prev_sibling();
        }
    }

    Ok(links)
}

/// Resolves a link href to an absolute address
///
/// Returns None if the link should be excluded:
/// - Empty hrefs
/// - Non-HTTP(S) targets
/// - References that cannot be resolved against the base
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    // Skip empty hrefs
    if href.is_empty() {
        return None;
    }

    // Fully qualified references pass through unchanged
    if let Ok(absolute) = Url::parse(href) {
        return match absolute.scheme() {
            "http" | "https" if absolute.has_host() => Some(href.to_string()),
            _ => None,
        };
    }

    match base_url.join(href) {
        Ok(resolved) if resolved.scheme() == "http" || resolved.scheme() == "https" => {
            Some(resolved.to_string())
        }
        _ => None,
    }
}
