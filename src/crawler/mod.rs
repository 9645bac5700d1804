//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The frontier and its visited set
//! - HTTP fetching and retry accounting
//! - HTML parsing and link extraction
//! - Wave scheduling with bounded concurrency
//! - Pass coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod retry;
mod scheduler;
mod stats;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::Crawler;
pub use fetcher::{build_http_client, Fetcher, HttpFetcher};
pub use frontier::{EnqueueOutcome, Frontier, FrontierEntry};
pub use parser::{parse_html, ExtractedPage, HtmlExtractor, LinkExtractor};
pub use retry::{RetryDecision, RetryTracker};
pub use scheduler::{Scheduler, VisitOutcome, WaveReport};
pub use stats::PassStats;

use crate::config::Config;
use tokio_util::sync::CancellationToken;

/// Runs the crawler until cancelled
///
/// This is the main entry point for the service. It will:
/// 1. Build the HTTP client and probe the index store
/// 2. Run full crawl passes from the seed list
/// 3. Start the next pass after `passDelaySeconds`
/// 4. Stop once `cancel` fires, after a final flush
///
/// # Returns
///
/// * `Ok(())` - The crawler was cancelled
/// * `Err(IndexerError)` - Startup failed
pub async fn crawl(config: Config, cancel: CancellationToken) -> crate::Result<()> {
    let crawler = Crawler::from_config(&config).await?;
    crawler.run_forever(cancel, config.pass_delay()).await;
    Ok(())
}
