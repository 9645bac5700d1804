//! Threshold-triggered batch accumulator in front of a `BulkStore`

use crate::index::traits::{BulkStore, FlushOutcome, IndexSink};
use crate::page::ScrapedPage;
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Buffers pages and writes them to a store in bulk
///
/// The batch lock is held across the bulk write, so no page can be appended
/// between the size check and the write, and a failed write leaves the batch
/// exactly as it was plus whatever arrives afterwards.
pub struct BulkIndexer<S> {
    store: S,
    bulk_size: usize,
    batch: Mutex<Vec<ScrapedPage>>,
}

impl<S: BulkStore> BulkIndexer<S> {
    /// Creates an indexer that flushes once more than `bulk_size` pages are
    /// pending
    pub fn new(store: S, bulk_size: usize) -> Self {
        Self {
            store,
            bulk_size: bulk_size.max(1),
            batch: Mutex::new(Vec::new()),
        }
    }

    /// Number of pages waiting for a flush
    pub async fn pending(&self) -> usize {
        self.batch.lock().await.len()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn write(&self, batch: &mut Vec<ScrapedPage>) -> FlushOutcome {
        match self.store.bulk_upsert(batch).await {
            Ok(count) => {
                tracing::info!(count, "Bulk indexed pages");
                batch.clear();
                FlushOutcome::Flushed { count }
            }
            Err(e) => {
                tracing::error!(pending = batch.len(), "Failed to bulk index: {}", e);
                FlushOutcome::Failed {
                    pending: batch.len(),
                }
            }
        }
    }
}

#[async_trait]
impl<S: BulkStore> IndexSink for BulkIndexer<S> {
    async fn index_batch(&self, pages: Vec<ScrapedPage>) -> FlushOutcome {
        let mut batch = self.batch.lock().await;
        batch.extend(pages);

        if batch.len() <= self.bulk_size {
            return FlushOutcome::Buffered {
                pending: batch.len(),
            };
        }

        self.write(&mut batch).await
    }

    async fn flush(&self) -> FlushOutcome {
        let mut batch = self.batch.lock().await;
        if batch.is_empty() {
            return FlushOutcome::Buffered { pending: 0 };
        }
        self.write(&mut batch).await
    }
}
