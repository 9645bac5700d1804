//! Index sink traits and types
//!
//! This module defines the trait interface the crawler hands completed pages
//! to, and the bulk-write interface a backing store implements.

use crate::page::ScrapedPage;
use crate::FlushError;
use async_trait::async_trait;

/// Result of handing pages to an index sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Pages were added to the batch; no flush was triggered
    Buffered { pending: usize },

    /// A bulk write succeeded and the batch is now empty
    Flushed { count: usize },

    /// A bulk write failed; every pending page is still in the batch
    Failed { pending: usize },
}

/// Receives completed pages from the crawler
///
/// Failures are logged and reported through `FlushOutcome`, never returned as
/// errors. Implementations must be thread-safe.
#[async_trait]
pub trait IndexSink: Send + Sync {
    /// Appends pages to the batch and flushes once it holds more than the
    /// size threshold
    ///
    /// An empty `pages` list is accepted; it may still trigger a flush if a
    /// previous flush failed and left the batch above the threshold.
    async fn index_batch(&self, pages: Vec<ScrapedPage>) -> FlushOutcome;

    /// Writes whatever is pending, regardless of the threshold
    async fn flush(&self) -> FlushOutcome;
}

/// A store that accepts bulk upserts keyed by page URL
#[async_trait]
pub trait BulkStore: Send + Sync {
    /// Upserts every page in one request and returns the number written
    ///
    /// Must be idempotent: writing a page whose URL already exists replaces
    /// the stored document.
    async fn bulk_upsert(&self, pages: &[ScrapedPage]) -> Result<usize, FlushError>;
}
