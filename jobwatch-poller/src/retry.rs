//! Retry policy
//!
//! Exponential backoff over consecutive fetch failures. Once the fast-retry
//! budget is exhausted the counter resets and polling continues at the base
//! cadence; the poller never gives up on its own.

use std::time::Duration;

/// Outcome of recording one more failed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryDecision {
    /// Retry counter to publish after this failure
    pub retry_count: u32,
    /// Delay before the next attempt
    pub delay: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Backoff for the `retry_count`-th consecutive failure
    ///
    /// `base * 2^(retry_count - 1)` within the budget, `base` outside it
    /// (including `retry_count == 0`). Saturates rather than overflowing.
    pub fn backoff(&self, retry_count: u32, base: Duration) -> Duration {
        if retry_count == 0 || retry_count > self.max_retries {
            return base;
        }
        let factor = 1u32.checked_shl(retry_count - 1).unwrap_or(u32::MAX);
        base.saturating_mul(factor)
    }

    /// Records a failure on top of `previous` consecutive failures
    pub fn on_failure(&self, previous: u32, base: Duration) -> RetryDecision {
        let retry_count = previous.saturating_add(1);
        if retry_count > self.max_retries {
            return RetryDecision {
                retry_count: 0,
                delay: base,
            };
        }
        RetryDecision {
            retry_count,
            delay: self.backoff(retry_count, base),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(crate::options::DEFAULT_MAX_RETRIES)
    }
}
