use crate::events::CircuitBreakerEvent;
use hybridcache_core::events::EventListeners;
use std::time::Duration;

/// Configuration for a single tier's circuit breaker.
pub struct CircuitBreakerConfig {
    pub(crate) tier_name: String,
    pub(crate) failure_threshold: u32,
    pub(crate) open_timeout: Duration,
    pub(crate) success_threshold: u32,
    pub(crate) event_listeners: EventListeners<CircuitBreakerEvent>,
}

impl CircuitBreakerConfig {
    /// Creates a new configuration builder.
    pub fn builder(tier_name: impl Into<String>) -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new(tier_name)
    }

    /// Default breaker tuning for the memory tier: most tolerant of the three.
    pub fn memory_defaults() -> Self {
        Self::builder("memory")
            .failure_threshold(5)
            .open_timeout(Duration::from_secs(30))
            .success_threshold(1)
            .build()
    }

    /// Default breaker tuning for the persistent tier: moderate tolerance.
    pub fn persistent_defaults() -> Self {
        Self::builder("persistent")
            .failure_threshold(3)
            .open_timeout(Duration::from_secs(60))
            .success_threshold(1)
            .build()
    }

    /// Default breaker tuning for the origin tier: least tolerant, requires
    /// several consecutive successes in half-open before trusting it again.
    pub fn origin_defaults() -> Self {
        Self::builder("origin")
            .failure_threshold(2)
            .open_timeout(Duration::from_secs(120))
            .success_threshold(3)
            .build()
    }
}

/// Builder for a [`CircuitBreakerConfig`].
pub struct CircuitBreakerConfigBuilder {
    tier_name: String,
    failure_threshold: u32,
    open_timeout: Duration,
    success_threshold: u32,
    event_listeners: EventListeners<CircuitBreakerEvent>,
}

impl CircuitBreakerConfigBuilder {
    /// Creates a new builder with conservative defaults (threshold 5, open 30s).
    pub fn new(tier_name: impl Into<String>) -> Self {
        Self {
            tier_name: tier_name.into(),
            failure_threshold: 5,
            open_timeout: Duration::from_secs(30),
            success_threshold: 1,
            event_listeners: EventListeners::new(),
        }
    }

    /// Sets the number of consecutive failures that trips the breaker open.
    pub fn failure_threshold(mut self, n: u32) -> Self {
        self.failure_threshold = n;
        self
    }

    /// Sets how long the breaker stays open before allowing a half-open probe.
    pub fn open_timeout(mut self, duration: Duration) -> Self {
        self.open_timeout = duration;
        self
    }

    /// Sets the number of consecutive half-open successes required to close.
    pub fn success_threshold(mut self, n: u32) -> Self {
        self.success_threshold = n;
        self
    }

    /// Registers a callback invoked on every state transition.
    pub fn on_state_transition<F>(mut self, f: F) -> Self
    where
        F: Fn(crate::circuit::CircuitState, crate::circuit::CircuitState) + Send + Sync + 'static,
    {
        use hybridcache_core::events::FnListener;
        self.event_listeners
            .add(FnListener::new(move |event: &CircuitBreakerEvent| {
                if let CircuitBreakerEvent::StateTransition {
                    from_state,
                    to_state,
                    ..
                } = event
                {
                    f(*from_state, *to_state);
                }
            }));
        self
    }

    /// Builds the immutable configuration.
    pub fn build(self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            tier_name: self.tier_name,
            failure_threshold: self.failure_threshold,
            open_timeout: self.open_timeout,
            success_threshold: self.success_threshold,
            event_listeners: self.event_listeners,
        }
    }
}
