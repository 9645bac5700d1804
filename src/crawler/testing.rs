//! In-memory fetcher and sink shared by the crawler unit tests

use crate::crawler::fetcher::Fetcher;
use crate::index::{FlushOutcome, IndexSink};
use crate::page::ScrapedPage;
use crate::url::visit_key;
use crate::FetchError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Serves pages from a map keyed by visit key
///
/// Unknown URLs answer 404. URLs registered with `fail_times` fail with a
/// connection error that many times before being served normally.
#[derive(Default)]
pub struct MockFetcher {
    pages: Mutex<HashMap<String, String>>,
    failures: Mutex<HashMap<String, u32>>,
    calls: Mutex<Vec<String>>,
    delay: Duration,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn add_page(&self, url: &str, html: &str) {
        self.pages
            .lock()
            .unwrap()
            .insert(visit_key(url), html.to_string());
    }

    pub fn fail_times(&self, url: &str, times: u32) {
        self.failures.lock().unwrap().insert(visit_key(url), times);
    }

    pub fn calls_for(&self, url: &str) -> usize {
        let key = visit_key(url);
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| **call == key)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Highest number of fetches observed in flight at once
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let key = visit_key(url);
        self.calls.lock().unwrap().push(key.clone());

        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(active, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        {
            let mut failures = self.failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(&key) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(FetchError::Connect {
                        url: url.to_string(),
                        message: "connection reset".to_string(),
                    });
                }
            }
        }

        self.pages
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// Keeps every page it is handed and records each batch call
#[derive(Default)]
pub struct RecordingSink {
    pub batches: Mutex<Vec<usize>>,
    pub pages: Mutex<Vec<ScrapedPage>>,
    pub flushes: AtomicUsize,
}

impl RecordingSink {
    pub fn urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self
            .pages
            .lock()
            .unwrap()
            .iter()
            .map(|page| page.url.clone())
            .collect();
        urls.sort();
        urls
    }
}

#[async_trait]
impl IndexSink for RecordingSink {
    async fn index_batch(&self, pages: Vec<ScrapedPage>) -> FlushOutcome {
        let count = pages.len();
        self.batches.lock().unwrap().push(count);
        self.pages.lock().unwrap().extend(pages);
        FlushOutcome::Flushed { count }
    }

    async fn flush(&self) -> FlushOutcome {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        FlushOutcome::Buffered { pending: 0 }
    }
}
