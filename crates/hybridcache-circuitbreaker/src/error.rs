use thiserror::Error;

/// Error raised by a `CircuitBreaker` when a call is rejected.
#[derive(Debug, Clone, Error)]
pub enum CircuitBreakerError {
    /// The breaker for the named tier is open; the call was not attempted.
    #[error("circuit breaker for tier '{tier}' is open")]
    Open {
        /// Name of the tier whose breaker rejected the call.
        tier: String,
    },
}

impl CircuitBreakerError {
    /// The tier whose breaker rejected the call.
    pub fn tier(&self) -> &str {
        let CircuitBreakerError::Open { tier } = self;
        tier
    }
}

impl From<CircuitBreakerError> for hybridcache_core::EngineError {
    fn from(err: CircuitBreakerError) -> Self {
        let CircuitBreakerError::Open { tier } = err;
        hybridcache_core::EngineError::CircuitOpen { tier }
    }
}
