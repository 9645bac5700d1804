use url::Url;

/// Computes the key a URL is deduplicated under
///
/// The fragment is dropped and the whole string is lowercased, so
/// `http://A.test/Page#top` and `http://a.test/page` share one key. Strings
/// that do not parse are lowercased as-is; they still get a stable key and
/// fail later at fetch time.
///
/// # Examples
///
/// ```
/// use page_indexer::url::visit_key;
///
/// assert_eq!(visit_key("HTTP://Example.com/Page#intro"), "http://example.com/page");
/// ```
pub fn visit_key(url_str: &str) -> String {
    match Url::parse(url_str.trim()) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.as_str().to_lowercase()
        }
        Err(_) => url_str.trim().to_lowercase(),
    }
}
