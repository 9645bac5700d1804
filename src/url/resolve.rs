use crate::{UrlError, UrlResult};
use url::Url;

/// Schemes that never lead to a crawlable page
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Resolves an href against the URL of the page it appeared on
///
/// Returns an error if the link should be excluded:
/// - empty or fragment-only hrefs
/// - javascript:, mailto:, tel: and data: hrefs
/// - hrefs that do not resolve
/// - non-HTTP(S) URLs after resolution
///
/// # Examples
///
/// ```
/// use page_indexer::url::resolve_href;
/// use url::Url;
///
/// let base = Url::parse("http://example.com/x").unwrap();
/// assert_eq!(resolve_href("/page1", &base).unwrap().as_str(), "http://example.com/page1");
/// ```
pub fn resolve_href(href: &str, base_url: &Url) -> UrlResult<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return Err(UrlError::Unsupported(href.to_string()));
    }

    let lowered = href.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme)) {
        return Err(UrlError::Unsupported(href.to_string()));
    }

    let absolute = base_url
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    match absolute.scheme() {
        "http" | "https" => Ok(absolute),
        other => Err(UrlError::InvalidScheme(other.to_string())),
    }
}
