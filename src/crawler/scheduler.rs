//! Wave scheduler for draining the frontier with bounded concurrency
//!
//! This module handles:
//! - Draining the frontier in waves of at most `max_concurrency` entries
//! - Global concurrency limiting via a semaphore
//! - Per-entry claim, fetch, extract and link discovery
//! - Retry requeueing with backoff for failed fetches
//!
//! A wave is a full barrier: `run_wave` returns only after every worker in it
//! has finished, so links discovered during a wave form the next one.

use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::{EnqueueOutcome, Frontier, FrontierEntry};
use crate::crawler::parser::LinkExtractor;
use crate::crawler::retry::{RetryDecision, RetryTracker};
use crate::page::{Link, ScrapedPage};
use crate::FetchError;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// What one worker did with one frontier entry
#[derive(Debug, Clone)]
pub enum VisitOutcome {
    /// The page was fetched and extracted
    Scraped(ScrapedPage),

    /// Another claimant already owns or finished this URL
    AlreadyClaimed,

    /// The fetch failed and the entry was requeued
    Retrying { attempt: u32 },

    /// The URL failed permanently and will not be scheduled again
    Abandoned { attempts: u32 },

    /// The pass was cancelled before the entry finished
    Cancelled,
}

/// Everything collected from one wave
#[derive(Debug, Default)]
pub struct WaveReport {
    pub entries: usize,
    pub pages: Vec<ScrapedPage>,
    pub already_claimed: usize,
    pub retried: usize,
    pub abandoned: usize,
    pub cancelled: usize,
    pub discovered_links: usize,
}

impl WaveReport {
    fn record(&mut self, outcome: VisitOutcome) {
        match outcome {
            VisitOutcome::Scraped(page) => {
                self.discovered_links += page.links.len();
                self.pages.push(page);
            }
            VisitOutcome::AlreadyClaimed => self.already_claimed += 1,
            VisitOutcome::Retrying { .. } => self.retried += 1,
            VisitOutcome::Abandoned { .. } => self.abandoned += 1,
            VisitOutcome::Cancelled => self.cancelled += 1,
        }
    }
}

/// Drains one frontier wave by wave
pub struct Scheduler {
    worker: Worker,

    /// Global semaphore for limiting concurrent workers
    permits: Arc<Semaphore>,

    max_concurrency: usize,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `frontier` - The frontier to drain
    /// * `fetcher` - Retrieves page content
    /// * `extractor` - Projects content into page fields and links
    /// * `retries` - Attempt counters for failing URLs
    /// * `max_concurrency` - Upper bound on in-flight workers
    /// * `cancel` - Aborts in-flight fetches and backoff sleeps when triggered
    pub fn new(
        frontier: Arc<Frontier>,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn LinkExtractor>,
        retries: Arc<RetryTracker>,
        max_concurrency: usize,
        cancel: CancellationToken,
    ) -> Self {
        let max_concurrency = max_concurrency.max(1);

        Self {
            worker: Worker {
                frontier,
                fetcher,
                extractor,
                retries,
                cancel,
            },
            permits: Arc::new(Semaphore::new(max_concurrency)),
            max_concurrency,
        }
    }

    /// Drains up to `max_concurrency` entries and processes them concurrently
    ///
    /// Returns once every worker of the wave has returned.
    pub async fn run_wave(&self) -> WaveReport {
        let frontier = &self.worker.frontier;
        let wave_size = frontier.pending().min(self.max_concurrency);
        let entries = frontier.drain_wave(wave_size);

        let mut report = WaveReport {
            entries: entries.len(),
            ..WaveReport::default()
        };

        let mut workers = JoinSet::new();
        for entry in entries {
            let permit = match Arc::clone(&self.permits).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    frontier.requeue(entry);
                    continue;
                }
            };

            let worker = self.worker.clone();
            workers.spawn(async move {
                let _permit = permit;
                worker.visit(entry).await
            });
        }

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(outcome) => report.record(outcome),
                Err(e) => tracing::error!("Crawl worker failed: {}", e),
            }
        }

        report
    }
}

/// Per-entry processing shared by every task of a wave
#[derive(Clone)]
struct Worker {
    frontier: Arc<Frontier>,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn LinkExtractor>,
    retries: Arc<RetryTracker>,
    cancel: CancellationToken,
}

impl Worker {
    /// Processes a single entry
    ///
    /// This method:
    /// 1. Claims the URL, abandoning the entry if someone else holds it
    /// 2. Fetches the page
    /// 3. Extracts content and links
    /// 4. Enqueues undiscovered links one hop deeper
    /// 5. Builds the ScrapedPage
    async fn visit(&self, entry: FrontierEntry) -> VisitOutcome {
        if !self.frontier.try_claim(&entry.url) {
            tracing::trace!(url = %entry.url, "Already claimed");
            return VisitOutcome::AlreadyClaimed;
        }

        tracing::debug!(url = %entry.url, depth = entry.depth, "Fetching");

        let fetched = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(FetchError::Cancelled { url: entry.url.clone() }),
            result = self.fetcher.fetch(&entry.url) => result,
        };

        match fetched {
            Ok(content) => self.complete(entry, content),
            Err(FetchError::Cancelled { .. }) => {
                self.frontier.release(&entry.url);
                VisitOutcome::Cancelled
            }
            Err(e) => self.handle_failure(entry, e).await,
        }
    }

    fn complete(&self, entry: FrontierEntry, content: String) -> VisitOutcome {
        let extracted = self.extractor.extract(&content, &entry.url);

        self.frontier.mark_visited(&entry.url);
        self.retries.clear(&entry.url);
        self.enqueue_links(&extracted.links, entry.depth);

        VisitOutcome::Scraped(ScrapedPage {
            url: entry.url,
            title: extracted.title,
            raw_content: Some(content),
            headings: extracted.headings,
            paragraphs: extracted.paragraphs,
            links: extracted.links,
            images: extracted.images,
            scraped_at: Utc::now(),
        })
    }

    /// Offers every link not yet visited to the frontier at `depth + 1`
    fn enqueue_links(&self, links: &[Link], depth: u32) {
        let next_depth = depth.saturating_add(1);
        let mut queued = 0;

        for link in links {
            if self.frontier.is_visited(&link.url) {
                continue;
            }
            if self.frontier.enqueue(&link.url, next_depth) == EnqueueOutcome::Queued {
                queued += 1;
            }
        }

        tracing::trace!(found = links.len(), queued, depth = next_depth, "Enqueued links");
    }

    async fn handle_failure(&self, entry: FrontierEntry, error: FetchError) -> VisitOutcome {
        let decision = if error.is_retryable() {
            self.retries.record_failure(&entry.url)
        } else {
            let attempts = self.retries.attempts(&entry.url) + 1;
            self.retries.clear(&entry.url);
            RetryDecision::Abandon { attempts }
        };

        match decision {
            RetryDecision::Retry { attempt, delay } => {
                tracing::warn!(
                    url = %entry.url,
                    attempt,
                    delay = ?delay,
                    "Fetch failed, will retry: {}",
                    error
                );

                if !self.backoff(delay).await {
                    self.frontier.release(&entry.url);
                    return VisitOutcome::Cancelled;
                }

                self.frontier.release(&entry.url);
                self.frontier.requeue(entry);
                VisitOutcome::Retrying { attempt }
            }
            RetryDecision::Abandon { attempts } => {
                tracing::error!(
                    url = %entry.url,
                    attempts,
                    "Abandoning URL after fetch failure: {}",
                    error
                );
                self.frontier.mark_visited(&entry.url);
                VisitOutcome::Abandoned { attempts }
            }
        }
    }

    /// Sleeps for `delay`; returns false if the pass was cancelled first
    async fn backoff(&self, delay: Duration) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }
}
