//! The engine-wide error type.
//!
//! `EngineError` is the single closed set of error kinds every hybridcache
//! component ultimately surfaces to a caller. Per-crate error types
//! (`CircuitBreakerError`, `TierError`, `RecoveryError`, ...) exist for
//! precise local matching inside their own crate, and convert into
//! `EngineError` at the boundary where the fallback handler or engine calls
//! into them — the same layering the teacher uses between a crate-local
//! `CircuitBreakerError<E>` and whatever error type the caller's own service
//! uses.

use std::fmt;
use thiserror::Error;

/// Closed set of error kinds a hybridcache operation can surface.
///
/// Variants map 1:1 onto the table in the design's error-handling section:
/// absence (`NotFound`) never propagates past a tier that can be skipped;
/// impossibility (`MalformedKey`, `Disposed`, `AllTiersFailed`) always does.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// The key was absent in the addressed tier.
    #[error("key not found")]
    NotFound,

    /// Upstream rejected the credentials used for the request.
    #[error("upstream rejected credentials")]
    Unauthorized,

    /// Upstream refused the request for the authenticated identity.
    #[error("upstream forbade the request")]
    Forbidden,

    /// The tier's circuit breaker rejected the call.
    #[error("circuit breaker for tier '{tier}' is open")]
    CircuitOpen {
        /// Name of the tier whose breaker rejected the call.
        tier: String,
    },

    /// A tier call exceeded its allotted time window.
    #[error("operation on tier '{tier}' timed out after {elapsed_ms}ms")]
    Timeout {
        /// Name of the tier that timed out.
        tier: String,
        /// How long the call ran before it was abandoned.
        elapsed_ms: u64,
    },

    /// A connection-refused / DNS / 5xx-class failure.
    #[error("transient I/O failure on tier '{tier}': {message}")]
    TransientIo {
        /// Name of the tier that failed.
        tier: String,
        /// Human-readable detail from the underlying failure.
        message: String,
    },

    /// `KeyCodec` rejected a fingerprint or tuple.
    #[error("malformed key: {reason}")]
    MalformedKey {
        /// Why the key was rejected.
        reason: String,
    },

    /// A write violated a tier's per-entry or aggregate capacity.
    #[error("write to tier '{tier}' exceeds capacity ({size_bytes} bytes)")]
    CapacityExceeded {
        /// Name of the tier that rejected the write.
        tier: String,
        /// Size of the value that was rejected.
        size_bytes: usize,
    },

    /// The record is missing required fields and repair failed or was
    /// declined by the active request's policy.
    #[error("result for '{key}' is partial; missing fields: {missing_fields:?}")]
    PartialResult {
        /// The key whose value is incomplete.
        key: String,
        /// The fields still missing after the repair attempt.
        missing_fields: Vec<String>,
    },

    /// Every tier in the fallback chain failed or yielded nothing usable,
    /// and the emergency stale pass also found nothing.
    #[error("all tiers failed for '{key}': {attempted:?}")]
    AllTiersFailed {
        /// The key being looked up.
        key: String,
        /// The tiers that were attempted, in order.
        attempted: Vec<String>,
    },

    /// The `RecoveryManager` exhausted its retry budget with no configured
    /// fallback.
    #[error("recovery failed for '{key}' after {attempts} attempt(s): {last_error}")]
    RecoveryFailed {
        /// The key being operated on.
        key: String,
        /// Number of attempts made, including the first.
        attempts: u32,
        /// The last error observed before giving up.
        last_error: String,
    },

    /// The engine or tier the operation targeted has already been disposed.
    #[error("operation attempted on a disposed engine or tier")]
    Disposed,
}

impl EngineError {
    /// True for errors that indicate the key is simply absent — these must
    /// never propagate past a tier the fallback chain can still try.
    pub fn is_absence(&self) -> bool {
        matches!(self, EngineError::NotFound)
    }

    /// True for errors that indicate the operation is impossible regardless
    /// of which tier answers — these always propagate to the caller.
    pub fn is_impossible(&self) -> bool {
        matches!(
            self,
            EngineError::MalformedKey { .. }
                | EngineError::Disposed
                | EngineError::AllTiersFailed { .. }
        )
    }

    /// True if this error should count toward a circuit breaker's failure
    /// tally when classified by the recovery manager as retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::Timeout { .. } | EngineError::TransientIo { .. }
        )
    }

    /// True if retrying this error can never succeed.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EngineError::NotFound
                | EngineError::Unauthorized
                | EngineError::Forbidden
                | EngineError::MalformedKey { .. }
                | EngineError::CircuitOpen { .. }
        )
    }
}

/// Severity used by notifications and log records across the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    /// Informational; no action needed.
    Info,
    /// Degraded but still serving correct (if stale/partial) data.
    Warning,
    /// A component is failing; behavior may be wrong for some requests.
    Error,
    /// The engine cannot serve some class of request at all.
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_absence_not_impossible() {
        let err = EngineError::NotFound;
        assert!(err.is_absence());
        assert!(!err.is_impossible());
    }

    #[test]
    fn malformed_key_and_disposed_are_impossible() {
        assert!(EngineError::MalformedKey {
            reason: "empty segment".into()
        }
        .is_impossible());
        assert!(EngineError::Disposed.is_impossible());
        assert!(EngineError::AllTiersFailed {
            key: "k".into(),
            attempted: vec!["memory".into()],
        }
        .is_impossible());
    }

    #[test]
    fn timeout_and_transient_io_are_retryable() {
        assert!(EngineError::Timeout {
            tier: "origin".into(),
            elapsed_ms: 30_000,
        }
        .is_retryable());
        assert!(EngineError::TransientIo {
            tier: "origin".into(),
            message: "connection refused".into(),
        }
        .is_retryable());
        assert!(!EngineError::NotFound.is_retryable());
    }

    #[test]
    fn auth_errors_are_terminal() {
        assert!(EngineError::Unauthorized.is_terminal());
        assert!(EngineError::Forbidden.is_terminal());
        assert!(EngineError::CircuitOpen { tier: "origin".into() }.is_terminal());
    }

    #[test]
    fn severity_orders_by_escalation() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Critical);
    }
}
