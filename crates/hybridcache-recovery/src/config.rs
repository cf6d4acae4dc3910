use crate::backoff::{ExponentialBackoff, IntervalFunction};
use crate::events::RecoveryEvent;
use hybridcache_core::events::EventListeners;
use std::sync::Arc;
use std::time::Duration;

/// Tuning for a single tier's retry loop.
pub struct RetryStrategy {
    pub(crate) max_retries: u32,
    pub(crate) interval: Arc<dyn IntervalFunction>,
}

impl Clone for RetryStrategy {
    fn clone(&self) -> Self {
        Self {
            max_retries: self.max_retries,
            interval: Arc::clone(&self.interval),
        }
    }
}

impl RetryStrategy {
    /// Default tuning: 3 retries, 1s initial backoff doubling to a 30s cap.
    pub fn default_tuning() -> Self {
        Self {
            max_retries: 3,
            interval: Arc::new(
                ExponentialBackoff::new(Duration::from_millis(1000))
                    .with_multiplier(2.0)
                    .with_max_interval(Duration::from_millis(30_000)),
            ),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_interval(mut self, interval: impl IntervalFunction + 'static) -> Self {
        self.interval = Arc::new(interval);
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.interval.interval(attempt)
    }
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self::default_tuning()
    }
}

/// Configuration for a `RecoveryManager` guarding one tier.
pub struct RecoveryConfig {
    pub(crate) tier_name: String,
    pub(crate) strategy: RetryStrategy,
    pub(crate) error_ring_capacity: usize,
    pub(crate) event_listeners: EventListeners<RecoveryEvent>,
}

impl RecoveryConfig {
    pub fn builder(tier_name: impl Into<String>) -> RecoveryConfigBuilder {
        RecoveryConfigBuilder::new(tier_name)
    }
}

/// Builder for a [`RecoveryConfig`].
pub struct RecoveryConfigBuilder {
    tier_name: String,
    strategy: RetryStrategy,
    error_ring_capacity: usize,
    event_listeners: EventListeners<RecoveryEvent>,
}

impl RecoveryConfigBuilder {
    pub fn new(tier_name: impl Into<String>) -> Self {
        Self {
            tier_name: tier_name.into(),
            strategy: RetryStrategy::default_tuning(),
            error_ring_capacity: 100,
            event_listeners: EventListeners::new(),
        }
    }

    pub fn strategy(mut self, strategy: RetryStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.strategy = self.strategy.with_max_retries(max_retries);
        self
    }

    pub fn error_ring_capacity(mut self, capacity: usize) -> Self {
        self.error_ring_capacity = capacity;
        self
    }

    pub fn on_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(u32, Duration) + Send + Sync + 'static,
    {
        use hybridcache_core::events::FnListener;
        self.event_listeners.add(FnListener::new(move |event: &RecoveryEvent| {
            if let RecoveryEvent::Retry { attempt, delay, .. } = event {
                f(*attempt, *delay);
            }
        }));
        self
    }

    pub fn on_exhausted<F>(mut self, f: F) -> Self
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        use hybridcache_core::events::FnListener;
        self.event_listeners.add(FnListener::new(move |event: &RecoveryEvent| {
            if let RecoveryEvent::Exhausted { attempts, .. } = event {
                f(*attempts);
            }
        }));
        self
    }

    pub fn build(self) -> RecoveryConfig {
        RecoveryConfig {
            tier_name: self.tier_name,
            strategy: self.strategy,
            error_ring_capacity: self.error_ring_capacity,
            event_listeners: self.event_listeners,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tuning_matches_spec_table() {
        let strategy = RetryStrategy::default_tuning();
        assert_eq!(strategy.max_retries(), 3);
        assert_eq!(strategy.delay_for_attempt(1), Duration::from_millis(1000));
        assert_eq!(strategy.delay_for_attempt(2), Duration::from_millis(2000));
        assert_eq!(strategy.delay_for_attempt(6), Duration::from_millis(30_000));
    }

    #[test]
    fn builder_overrides_max_retries() {
        let config = RecoveryConfig::builder("origin").max_retries(5).build();
        assert_eq!(config.strategy.max_retries(), 5);
        assert_eq!(config.tier_name, "origin");
    }
}
