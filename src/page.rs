//! Page records produced by the crawler and consumed by the index sink

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A hyperlink discovered on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    /// Absolute URL, resolved against the page it appeared on
    pub url: String,
    pub anchor_text: String,
}

/// An image referenced by a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub url: String,
    pub alt_text: String,
}

/// A successfully fetched and parsed page
///
/// Built once per URL per pass and never modified afterwards. Documents are
/// keyed by `url` in the index, so indexing the same page twice overwrites
/// the earlier copy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedPage {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
    pub headings: Vec<String>,
    pub paragraphs: Vec<String>,
    pub links: Vec<Link>,
    pub images: Vec<Image>,
    pub scraped_at: DateTime<Utc>,
}
