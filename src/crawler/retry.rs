//! Bounded per-URL retry accounting
//!
//! Attempt counters live apart from the visited set. A URL only reaches the
//! visited set once it succeeds or runs out of attempts.

use crate::config::RetryPolicy;
use crate::url::visit_key;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// What to do with a URL after a failed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Requeue after `delay`; `attempt` failures have been recorded so far
    Retry { attempt: u32, delay: Duration },
    /// Give up permanently after `attempts` failures
    Abandon { attempts: u32 },
}

/// Tracks failed attempts for URLs that have not yet succeeded
#[derive(Debug)]
pub struct RetryTracker {
    policy: RetryPolicy,
    attempts: Mutex<HashMap<String, u32>>,
}

impl RetryTracker {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    /// Records one failed attempt and decides whether to retry
    ///
    /// The counter is dropped once the URL is abandoned.
    pub fn record_failure(&self, url: &str) -> RetryDecision {
        let key = visit_key(url);
        let mut attempts = self.attempts.lock().unwrap_or_else(PoisonError::into_inner);
        let count = attempts.entry(key.clone()).or_insert(0);
        *count += 1;
        let attempt = *count;

        if attempt >= self.policy.max_attempts {
            attempts.remove(&key);
            RetryDecision::Abandon { attempts: attempt }
        } else {
            RetryDecision::Retry {
                attempt,
                delay: self.backoff(attempt),
            }
        }
    }

    /// Forgets the counter for a URL, e.g. after it succeeds
    pub fn clear(&self, url: &str) {
        let key = visit_key(url);
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
    }

    /// Failed attempts recorded for a URL that is still being retried
    pub fn attempts(&self, url: &str) -> u32 {
        let key = visit_key(url);
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .copied()
            .unwrap_or(0)
    }

    /// Exponential delay: base, 2x base, 4x base, ... capped at `max_backoff`
    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.policy
            .base_backoff
            .saturating_mul(factor)
            .min(self.policy.max_backoff)
    }
}
