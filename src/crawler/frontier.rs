//! Crawl frontier: pending-work queue plus the visited set
//!
//! The frontier is shared by every worker in a wave, so both the queue and the
//! claim table sit behind their own mutex. Critical sections never await.

use crate::url::visit_key;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A URL waiting to be visited, with its hop count from a seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    pub depth: u32,
}

impl FrontierEntry {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

/// Result of offering a discovered URL to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Queued,
    DepthExceeded,
}

/// Claim bookkeeping guarded by a single lock
///
/// `visited` only grows. `in_flight` holds URLs a worker currently owns; a
/// retryable failure hands the URL back so a requeued entry can claim it
/// again.
#[derive(Debug, Default)]
struct ClaimTable {
    visited: HashSet<String>,
    in_flight: HashSet<String>,
}

/// Pending-work queue and deduplication authority for one crawl pass
#[derive(Debug)]
pub struct Frontier {
    max_depth: u32,
    queue: Mutex<VecDeque<FrontierEntry>>,
    claims: Mutex<ClaimTable>,
    depth_drops: AtomicUsize,
}

impl Frontier {
    /// Creates an empty frontier that accepts entries up to `max_depth`
    pub fn new(max_depth: u32) -> Self {
        Self {
            max_depth,
            queue: Mutex::new(VecDeque::new()),
            claims: Mutex::new(ClaimTable::default()),
            depth_drops: AtomicUsize::new(0),
        }
    }

    /// Enqueues each seed at depth 0
    ///
    /// Seeds bypass both the depth bound and the visited set; duplicates are
    /// filtered when they are claimed.
    pub fn seed(&self, urls: &[String]) {
        let mut queue = self.queue();
        for url in urls {
            queue.push_back(FrontierEntry::new(url.clone(), 0));
        }
        tracing::debug!(count = urls.len(), "Seeded frontier");
    }

    /// Atomically claims a URL for fetching
    ///
    /// Returns true iff no other caller has claimed this URL, whether that
    /// claim is still in flight or already settled in the visited set.
    pub fn try_claim(&self, url: &str) -> bool {
        let key = visit_key(url);
        let mut claims = self.claims();
        if claims.visited.contains(&key) || claims.in_flight.contains(&key) {
            return false;
        }
        claims.in_flight.insert(key)
    }

    /// Returns a claimed URL without marking it visited
    pub fn release(&self, url: &str) {
        let key = visit_key(url);
        self.claims().in_flight.remove(&key);
    }

    /// Settles a URL in the visited set so it is never scheduled again
    pub fn mark_visited(&self, url: &str) {
        let key = visit_key(url);
        let mut claims = self.claims();
        claims.in_flight.remove(&key);
        claims.visited.insert(key);
    }

    /// Returns true if the URL is claimed or visited
    pub fn is_visited(&self, url: &str) -> bool {
        let key = visit_key(url);
        let claims = self.claims();
        claims.visited.contains(&key) || claims.in_flight.contains(&key)
    }

    /// Appends an entry if it lies within the depth bound
    pub fn enqueue(&self, url: &str, depth: u32) -> EnqueueOutcome {
        if depth > self.max_depth {
            self.depth_drops.fetch_add(1, Ordering::Relaxed);
            tracing::info!(url, depth, max_depth = self.max_depth, "Max depth reached");
            return EnqueueOutcome::DepthExceeded;
        }

        self.queue().push_back(FrontierEntry::new(url, depth));
        EnqueueOutcome::Queued
    }

    /// Puts a previously drained entry back at the tail of the queue
    pub fn requeue(&self, entry: FrontierEntry) {
        self.queue().push_back(entry);
    }

    /// Removes and returns up to `max_count` entries in FIFO order
    pub fn drain_wave(&self, max_count: usize) -> Vec<FrontierEntry> {
        let mut queue = self.queue();
        let count = max_count.min(queue.len());
        queue.drain(..count).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue().is_empty()
    }

    /// Number of entries waiting in the queue
    pub fn pending(&self) -> usize {
        self.queue().len()
    }

    /// Number of URLs settled in the visited set
    pub fn visited_count(&self) -> usize {
        self.claims().visited.len()
    }

    /// Number of entries dropped for exceeding the depth bound
    pub fn depth_drops(&self) -> usize {
        self.depth_drops.load(Ordering::Relaxed)
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<FrontierEntry>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn claims(&self) -> MutexGuard<'_, ClaimTable> {
        self.claims.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
