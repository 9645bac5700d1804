//! Page-Indexer: a depth-bounded crawler feeding a search index
//!
//! This crate discovers pages by following hyperlinks from a set of seed URLs,
//! extracts a structured projection of each page, and hands completed pages to
//! a bulk indexing sink.

pub mod config;
pub mod crawler;
pub mod index;
pub mod page;
pub mod url;

use thiserror::Error;

/// Main error type for Page-Indexer operations
#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
///
/// Every variant is fatal: the process reports it and exits before crawling.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Index store unreachable at {uri}: {message}")]
    StoreUnreachable { uri: String, message: String },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Unsupported href: {0}")]
    Unsupported(String),
}

/// Errors raised while retrieving a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },

    #[error("Request failed for {url}: {message}")]
    Request { url: String, message: String },

    #[error("Fetch of {url} cancelled")]
    Cancelled { url: String },
}

impl FetchError {
    /// Returns true if a later attempt at the same URL may succeed
    ///
    /// Client errors are permanent except request-timeout (408) and
    /// too-many-requests (429).
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => {
                !(400..500).contains(status) || *status == 408 || *status == 429
            }
            Self::Cancelled { .. } => false,
            _ => true,
        }
    }
}

/// Errors raised by a bulk write against the index store
#[derive(Debug, Error)]
pub enum FlushError {
    #[error("Bulk request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Bulk request rejected with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Bulk request reported {failed} failed items: {reason}")]
    Items { failed: usize, reason: String },

    #[error("Failed to serialize document: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for Page-Indexer operations
pub type Result<T> = std::result::Result<T, IndexerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use crate::config::{Config, CrawlConfig};
pub use crate::page::{Image, Link, ScrapedPage};
pub use crate::url::{resolve_href, visit_key};
