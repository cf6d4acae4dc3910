use std::fmt;
use thiserror::Error;

/// Error raised when a `RecoveryManager` cannot produce a result.
#[derive(Debug, Clone, Error)]
pub enum RecoveryError<E> {
    /// The tier's circuit breaker was open; no attempt was made.
    #[error("circuit breaker for tier '{tier}' is open")]
    CircuitOpen { tier: String },
    /// Every retry attempt failed.
    #[error("recovery failed for '{key}' on tier '{tier}' after {attempts} attempt(s): {last_error}")]
    Exhausted {
        key: String,
        tier: String,
        attempts: u32,
        last_error: E,
    },
}

impl<E: fmt::Display> From<RecoveryError<E>> for hybridcache_core::EngineError {
    fn from(err: RecoveryError<E>) -> Self {
        match err {
            RecoveryError::CircuitOpen { tier } => hybridcache_core::EngineError::CircuitOpen { tier },
            RecoveryError::Exhausted {
                key,
                attempts,
                last_error,
                ..
            } => hybridcache_core::EngineError::RecoveryFailed {
                key,
                attempts,
                last_error: last_error.to_string(),
            },
        }
    }
}
