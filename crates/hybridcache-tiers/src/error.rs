//! Error type shared by every tier implementation.

use hybridcache_core::EngineError;
use thiserror::Error;

/// Errors a [`crate::tier::Tier`] can return. Converts 1:1 into
/// [`EngineError`] at the boundary where the fallback chain or engine calls
/// into a tier.
#[derive(Debug, Clone, Error)]
pub enum TierError {
    #[error("key not found")]
    NotFound,

    #[error("malformed key: {reason}")]
    MalformedKey { reason: String },

    #[error("write to tier '{tier}' exceeds capacity ({size_bytes} bytes)")]
    CapacityExceeded { tier: String, size_bytes: usize },

    #[error("storage failure on tier '{tier}': {message}")]
    TransientIo { tier: String, message: String },

    #[error("operation on tier '{tier}' timed out after {elapsed_ms}ms")]
    Timeout { tier: String, elapsed_ms: u64 },

    #[error("upstream rejected credentials")]
    Unauthorized,

    #[error("upstream forbade the request")]
    Forbidden,

    #[error("tier '{tier}' has already been disposed")]
    Disposed { tier: String },
}

impl TierError {
    /// True if retrying this error on the same tier can never succeed.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TierError::NotFound
                | TierError::MalformedKey { .. }
                | TierError::Unauthorized
                | TierError::Forbidden
                | TierError::Disposed { .. }
        )
    }

    /// True if this error should count toward a circuit breaker's failure
    /// tally.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TierError::Timeout { .. } | TierError::TransientIo { .. })
    }
}

impl From<TierError> for EngineError {
    fn from(err: TierError) -> Self {
        match err {
            TierError::NotFound => EngineError::NotFound,
            TierError::MalformedKey { reason } => EngineError::MalformedKey { reason },
            TierError::CapacityExceeded { tier, size_bytes } => {
                EngineError::CapacityExceeded { tier, size_bytes }
            }
            TierError::TransientIo { tier, message } => EngineError::TransientIo { tier, message },
            TierError::Timeout { tier, elapsed_ms } => EngineError::Timeout { tier, elapsed_ms },
            TierError::Unauthorized => EngineError::Unauthorized,
            TierError::Forbidden => EngineError::Forbidden,
            TierError::Disposed { .. } => EngineError::Disposed,
        }
    }
}
