//! Events emitted by a `RecoveryManager` as it drives the retry loop.

use hybridcache_core::events::ComponentEvent;
use std::time::{Duration, Instant};

/// An event emitted by a `RecoveryManager` instance.
#[derive(Debug, Clone)]
pub enum RecoveryEvent {
    /// A retry attempt is about to be made after a backoff delay.
    Retry {
        tier_name: String,
        timestamp: Instant,
        attempt: u32,
        delay: Duration,
    },
    /// The operation succeeded, either on the first try or after retries.
    Success {
        tier_name: String,
        timestamp: Instant,
        attempts: u32,
    },
    /// The operation was classified as terminal and was not retried.
    TerminalError {
        tier_name: String,
        timestamp: Instant,
    },
    /// All retry attempts were exhausted without success.
    Exhausted {
        tier_name: String,
        timestamp: Instant,
        attempts: u32,
    },
    /// A call was skipped entirely because the tier's circuit breaker is open.
    CircuitOpenSkipped {
        tier_name: String,
        timestamp: Instant,
    },
}

impl ComponentEvent for RecoveryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RecoveryEvent::Retry { .. } => "retry",
            RecoveryEvent::Success { .. } => "success",
            RecoveryEvent::TerminalError { .. } => "terminal_error",
            RecoveryEvent::Exhausted { .. } => "exhausted",
            RecoveryEvent::CircuitOpenSkipped { .. } => "circuit_open_skipped",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            RecoveryEvent::Retry { timestamp, .. }
            | RecoveryEvent::Success { timestamp, .. }
            | RecoveryEvent::TerminalError { timestamp, .. }
            | RecoveryEvent::Exhausted { timestamp, .. }
            | RecoveryEvent::CircuitOpenSkipped { timestamp, .. } => *timestamp,
        }
    }

    fn component_name(&self) -> &str {
        match self {
            RecoveryEvent::Retry { tier_name, .. }
            | RecoveryEvent::Success { tier_name, .. }
            | RecoveryEvent::TerminalError { tier_name, .. }
            | RecoveryEvent::Exhausted { tier_name, .. }
            | RecoveryEvent::CircuitOpenSkipped { tier_name, .. } => tier_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_types_match_variant_names() {
        let now = Instant::now();

        let retry = RecoveryEvent::Retry {
            tier_name: "origin".to_string(),
            timestamp: now,
            attempt: 1,
            delay: Duration::from_secs(1),
        };
        assert_eq!(retry.event_type(), "retry");
        assert_eq!(retry.component_name(), "origin");

        let exhausted = RecoveryEvent::Exhausted {
            tier_name: "origin".to_string(),
            timestamp: now,
            attempts: 3,
        };
        assert_eq!(exhausted.event_type(), "exhausted");

        let skipped = RecoveryEvent::CircuitOpenSkipped {
            tier_name: "origin".to_string(),
            timestamp: now,
        };
        assert_eq!(skipped.event_type(), "circuit_open_skipped");
    }
}
