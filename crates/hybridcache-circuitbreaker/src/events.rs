//! Events emitted by a tier's circuit breaker as it transitions state.

use hybridcache_core::events::ComponentEvent;
use std::time::Instant;

use crate::circuit::CircuitState;

/// An event emitted by a `CircuitBreaker` instance.
#[derive(Debug, Clone)]
pub enum CircuitBreakerEvent {
    /// The breaker moved from one state to another.
    StateTransition {
        tier_name: String,
        timestamp: Instant,
        from_state: CircuitState,
        to_state: CircuitState,
    },
    /// A call was allowed through.
    CallPermitted {
        tier_name: String,
        timestamp: Instant,
        state: CircuitState,
    },
    /// A call was rejected because the breaker is open.
    CallRejected {
        tier_name: String,
        timestamp: Instant,
    },
    /// A call succeeded and was recorded against the breaker.
    SuccessRecorded {
        tier_name: String,
        timestamp: Instant,
        state: CircuitState,
    },
    /// A call failed and was recorded against the breaker.
    FailureRecorded {
        tier_name: String,
        timestamp: Instant,
        state: CircuitState,
    },
}

impl ComponentEvent for CircuitBreakerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CircuitBreakerEvent::StateTransition { .. } => "state_transition",
            CircuitBreakerEvent::CallPermitted { .. } => "call_permitted",
            CircuitBreakerEvent::CallRejected { .. } => "call_rejected",
            CircuitBreakerEvent::SuccessRecorded { .. } => "success_recorded",
            CircuitBreakerEvent::FailureRecorded { .. } => "failure_recorded",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            CircuitBreakerEvent::StateTransition { timestamp, .. }
            | CircuitBreakerEvent::CallPermitted { timestamp, .. }
            | CircuitBreakerEvent::CallRejected { timestamp, .. }
            | CircuitBreakerEvent::SuccessRecorded { timestamp, .. }
            | CircuitBreakerEvent::FailureRecorded { timestamp, .. } => *timestamp,
        }
    }

    fn component_name(&self) -> &str {
        match self {
            CircuitBreakerEvent::StateTransition { tier_name, .. }
            | CircuitBreakerEvent::CallPermitted { tier_name, .. }
            | CircuitBreakerEvent::CallRejected { tier_name, .. }
            | CircuitBreakerEvent::SuccessRecorded { tier_name, .. }
            | CircuitBreakerEvent::FailureRecorded { tier_name, .. } => tier_name,
        }
    }
}
