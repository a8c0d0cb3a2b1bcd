//! Retry policy
//!
//! A [`RetryPolicy`] answers one question after each failed attempt:
//! how long to wait before the next one, or whether to give up.
//!
//! The default retries forever with a fixed one-second pause. Bounded
//! and exponential variants are built with the `with_*` methods.

use std::time::Duration;

/// When and how often a failed panel fetch is retried
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts allowed, including the first (`None`: unlimited)
    pub max_attempts: Option<u32>,
    /// Pause after the first failure (default: 1 s)
    pub initial_backoff: Duration,
    /// Growth factor applied to the pause after each further failure;
    /// values below 1.0 are treated as 1.0 (default: 1.0)
    pub multiplier: f64,
    /// Upper bound on any single pause (default: 1 s)
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: None,
            initial_backoff: Duration::from_secs(1),
            multiplier: 1.0,
            max_backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Never retry.
    pub fn none() -> Self {
        Self::default().with_max_attempts(1)
    }

    /// Limit the total number of attempts (at least one is always made)
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts.max(1));
        self
    }

    /// Use a fixed pause between attempts
    pub fn with_fixed_backoff(mut self, delay: Duration) -> Self {
        self.initial_backoff = delay;
        self.max_backoff = delay;
        self.multiplier = 1.0;
        self
    }

    /// Grow the pause geometrically from `initial` up to `max`
    pub fn with_exponential_backoff(mut self, initial: Duration, multiplier: f64, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.multiplier = multiplier;
        self.max_backoff = max;
        self
    }

    /// Pause to take after attempt number `attempt` (1-based) failed.
    ///
    /// Returns `None` when no attempts remain.
    pub fn backoff_after(&self, attempt: u32) -> Option<Duration> {
        if let Some(max) = self.max_attempts
            && attempt >= max
        {
            return None;
        }
        let factor = self.multiplier.max(1.0).powi(attempt.saturating_sub(1) as i32);
        let nanos = (self.initial_backoff.as_nanos() as f64 * factor)
            .min(self.max_backoff.as_nanos() as f64);
        Some(Duration::from_nanos(nanos.round() as u64))
    }
}
