//! Crawler coordinator - pass orchestration
//!
//! This module contains the pass loop that ties the pieces together:
//! - Seeding a fresh frontier for every pass
//! - Running waves until the frontier drains
//! - Handing each wave's pages to the index sink
//! - Repeating passes until cancelled

use crate::config::{Config, CrawlConfig, RetryPolicy};
use crate::crawler::fetcher::{build_http_client, Fetcher, HttpFetcher};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::{HtmlExtractor, LinkExtractor};
use crate::crawler::retry::RetryTracker;
use crate::crawler::scheduler::Scheduler;
use crate::crawler::stats::PassStats;
use crate::index::{BulkIndexer, ElasticStore, IndexSink};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Runs crawl passes against one index sink
///
/// The sink outlives individual passes, so pages left in its batch by a
/// failed flush are retried on the next trigger rather than lost.
pub struct Crawler {
    config: CrawlConfig,
    retry_policy: RetryPolicy,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn LinkExtractor>,
    sink: Arc<dyn IndexSink>,
}

impl Crawler {
    pub fn new(
        config: CrawlConfig,
        retry_policy: RetryPolicy,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn LinkExtractor>,
        sink: Arc<dyn IndexSink>,
    ) -> Self {
        Self {
            config,
            retry_policy,
            fetcher,
            extractor,
            sink,
        }
    }

    /// Builds the production crawler from a validated configuration
    ///
    /// Probes the index store first; an unreachable store is a startup error.
    pub async fn from_config(config: &Config) -> crate::Result<Self> {
        let client = build_http_client(&config.user_agent, config.fetch_timeout())?;

        let store = ElasticStore::new(client.clone(), &config.elastic);
        store.check_connection().await?;

        let crawl_config = config.crawl_config();
        let sink = BulkIndexer::new(store, crawl_config.bulk_size);

        Ok(Self::new(
            crawl_config,
            config.retry_policy(),
            Arc::new(HttpFetcher::new(client)),
            Arc::new(HtmlExtractor),
            Arc::new(sink),
        ))
    }

    /// Runs one complete pass from the seed list
    ///
    /// This method:
    /// 1. Seeds a fresh frontier at depth 0
    /// 2. Runs waves until the frontier is empty or `cancel` fires
    /// 3. Hands each wave's pages to the sink, even when there are none
    /// 4. Forces a final flush of whatever the sink still holds
    pub async fn run_pass(&self, cancel: &CancellationToken) -> PassStats {
        let start = Instant::now();
        let frontier = Arc::new(Frontier::new(self.config.max_depth));
        frontier.seed(&self.config.seed_urls);

        let scheduler = Scheduler::new(
            Arc::clone(&frontier),
            Arc::clone(&self.fetcher),
            Arc::clone(&self.extractor),
            Arc::new(RetryTracker::new(self.retry_policy)),
            self.config.max_concurrency,
            cancel.clone(),
        );

        let mut stats = PassStats::default();

        while !frontier.is_empty() {
            if cancel.is_cancelled() {
                tracing::info!(pending = frontier.pending(), "Crawl pass cancelled");
                stats.cancelled = true;
                break;
            }

            let report = scheduler.run_wave().await;
            stats.record_wave(&report);

            tracing::debug!(
                wave = stats.waves,
                entries = report.entries,
                pages = report.pages.len(),
                pending = frontier.pending(),
                "Wave complete"
            );

            let outcome = self.sink.index_batch(report.pages).await;
            stats.record_flush(outcome);

            if report.cancelled > 0 {
                stats.cancelled = true;
                break;
            }
        }

        let outcome = self.sink.flush().await;
        stats.record_flush(outcome);

        stats.depth_drops = frontier.depth_drops();
        stats.elapsed = start.elapsed();

        tracing::info!(
            waves = stats.waves,
            scraped = stats.pages_scraped,
            indexed = stats.pages_indexed,
            pending = stats.pages_pending,
            retries = stats.retries,
            abandoned = stats.abandoned,
            depth_drops = stats.depth_drops,
            "Crawl pass finished in {:?} ({:.2} pages/sec)",
            stats.elapsed,
            stats.rate()
        );

        stats
    }

    /// Runs passes back to back until `cancel` fires
    pub async fn run_forever(&self, cancel: CancellationToken, pass_delay: Duration) {
        let mut pass: u64 = 0;

        while !cancel.is_cancelled() {
            pass += 1;
            tracing::info!(
                pass,
                seeds = self.config.seed_urls.len(),
                "Starting crawl pass"
            );

            self.run_pass(&cancel).await;

            if pass_delay.is_zero() {
                continue;
            }

            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(pass_delay) => {}
            }
        }

        tracing::info!(passes = pass, "Crawler stopped");
    }
}
