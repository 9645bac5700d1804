//! HTML parser for extracting links and page content
//!
//! This module turns a fetched document into the projection the index stores:
//! - Page title (from `<title>`)
//! - Headings (`<h1>` to `<h3>`) and paragraphs (`<p>`)
//! - Links to follow, resolved against the page URL
//! - Images with their alt text
//!
//! Extraction is best-effort. Malformed markup yields whatever the HTML5
//! parser recovers, and missing elements yield empty collections.

use crate::page::{Image, Link};
use crate::url::resolve_href;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPage {
    pub title: Option<String>,
    pub headings: Vec<String>,
    pub paragraphs: Vec<String>,

    /// Links with absolute http(s) URLs
    pub links: Vec<Link>,
    pub images: Vec<Image>,
}

/// Turns raw page content into an `ExtractedPage`
pub trait LinkExtractor: Send + Sync {
    /// Extracts the page projection; never fails
    fn extract(&self, content: &str, base_url: &str) -> ExtractedPage;
}

/// `LinkExtractor` built on the `scraper` HTML5 parser
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExtractor;

impl LinkExtractor for HtmlExtractor {
    fn extract(&self, content: &str, base_url: &str) -> ExtractedPage {
        let base = Url::parse(base_url).ok();
        if base.is_none() {
            tracing::debug!(base_url, "Base URL does not parse, links will be skipped");
        }
        parse_html(content, base.as_ref())
    }
}

/// Parses HTML content and extracts the page projection
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags whose href resolves to an http(s) URL
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs and fragment-only hrefs
/// - hrefs that fail to resolve (dropped silently)
///
/// # Example
///
/// ```
/// use page_indexer::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, Some(&base_url));
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links[0].url, "https://example.com/page");
/// ```
pub fn parse_html(html: &str, base_url: Option<&Url>) -> ExtractedPage {
    let document = Html::parse_document(html);

    ExtractedPage {
        title: extract_title(&document),
        headings: collect_text(&document, "h1, h2, h3"),
        paragraphs: collect_text(&document, "p"),
        links: base_url
            .map(|base| extract_links(&document, base))
            .unwrap_or_default(),
        images: extract_images(&document, base_url),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
}

/// Collects the trimmed, non-empty text of every element matching `selector`
fn collect_text(document: &Html, selector: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect()
}

/// Extracts all followable links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Vec<Link> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter(|element| element.value().attr("download").is_none())
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            let url = resolve_href(href, base_url).ok()?;
            Some(Link {
                url: url.to_string(),
                anchor_text: element_text(element),
            })
        })
        .collect()
}

/// Extracts images; `src` is resolved when possible and kept raw otherwise
fn extract_images(document: &Html, base_url: Option<&Url>) -> Vec<Image> {
    let Ok(img_selector) = Selector::parse("img[src]") else {
        return Vec::new();
    };

    document
        .select(&img_selector)
        .filter_map(|element| {
            let src = element.value().attr("src")?.trim();
            if src.is_empty() {
                return None;
            }
            let url = base_url
                .and_then(|base| base.join(src).ok())
                .map(|url| url.to_string())
                .unwrap_or_else(|| src.to_string());
            Some(Image {
                url,
                alt_text: element.value().attr("alt").unwrap_or("").trim().to_string(),
            })
        })
        .collect()
}

/// Joins an element's text nodes, collapsing runs of whitespace
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
