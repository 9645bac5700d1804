//! Per-pass crawl statistics

use crate::crawler::scheduler::WaveReport;
use crate::index::FlushOutcome;
use std::time::Duration;

/// Counters accumulated over one crawl pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Number of waves dispatched
    pub waves: usize,

    /// Pages fetched and extracted
    pub pages_scraped: usize,

    /// Entries dropped because their URL was already claimed
    pub duplicates_skipped: usize,

    /// Failed fetches that were requeued
    pub retries: usize,

    /// URLs given up on
    pub abandoned: usize,

    /// Links dropped for exceeding the depth bound
    pub depth_drops: usize,

    /// Pages the sink reported as written
    pub pages_indexed: usize,

    /// Pages still waiting in the sink when the pass ended
    pub pages_pending: usize,

    /// True if the pass stopped before the frontier drained
    pub cancelled: bool,

    pub elapsed: Duration,
}

impl PassStats {
    pub(crate) fn record_wave(&mut self, report: &WaveReport) {
        self.waves += 1;
        self.pages_scraped += report.pages.len();
        self.duplicates_skipped += report.already_claimed;
        self.retries += report.retried;
        self.abandoned += report.abandoned;
    }

    pub(crate) fn record_flush(&mut self, outcome: FlushOutcome) {
        match outcome {
            FlushOutcome::Flushed { count } => {
                self.pages_indexed += count;
                self.pages_pending = 0;
            }
            FlushOutcome::Buffered { pending } | FlushOutcome::Failed { pending } => {
                self.pages_pending = pending;
            }
        }
    }

    /// Pages per second over the pass
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.pages_scraped as f64 / secs
        } else {
            0.0
        }
    }
}
