//! Backoff interval strategies for the retry loop.

use std::time::Duration;

/// Computes the delay before the next retry attempt.
///
/// `attempt` is 1-indexed: the delay returned for `attempt == 1` is the wait
/// before the *first* retry (i.e. after the original call already failed
/// once).
pub trait IntervalFunction: Send + Sync {
    fn interval(&self, attempt: u32) -> Duration;
}

/// Exponential backoff: `initial * multiplier.powi(attempt - 1)`, capped at
/// `max_interval`.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial: Duration,
    multiplier: f64,
    max_interval: Duration,
}

impl ExponentialBackoff {
    pub fn new(initial: Duration) -> Self {
        Self {
            initial,
            multiplier: 2.0,
            max_interval: Duration::from_secs(30),
        }
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = max_interval;
        self
    }
}

impl IntervalFunction for ExponentialBackoff {
    fn interval(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let scaled = self.initial.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = scaled.min(self.max_interval.as_secs_f64());
        Duration::from_secs_f64(capped.max(0.0))
    }
}

/// A fixed delay between every retry attempt.
#[derive(Debug, Clone)]
pub struct FixedInterval {
    interval: Duration,
}

impl FixedInterval {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl IntervalFunction for FixedInterval {
    fn interval(&self, _attempt: u32) -> Duration {
        self.interval
    }
}
