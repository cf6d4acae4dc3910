//! Per-tier circuit breaker for hybridcache.
//!
//! Each tier (memory, persistent, origin) owns one `CircuitBreaker`. Unlike a
//! sliding-window rate-based breaker, this one trips on *consecutive*
//! failures, which is cheap to evaluate and matches how a single upstream
//! dependency's health is usually judged by its caller.
//!
//! ## States
//! - **Closed**: calls pass through; failures increment a counter that
//!   resets on any success.
//! - **Open**: calls are rejected immediately until `open_timeout` elapses.
//! - **Half-Open**: exactly one probe call is allowed through; enough
//!   consecutive successes close the circuit, any failure reopens it.
//!
//! ## Example
//!
//! ```rust
//! use hybridcache_circuitbreaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
//!
//! let breaker = CircuitBreaker::new(CircuitBreakerConfig::origin_defaults());
//! assert_eq!(breaker.state(), CircuitState::Closed);
//!
//! if breaker.try_acquire().is_ok() {
//!     // ... perform the call ...
//!     breaker.record_success();
//! }
//! ```

mod circuit;
mod config;
mod error;
mod events;

use circuit::Circuit;
use parking_lot::Mutex;

pub use circuit::{CircuitMetrics, CircuitState};
pub use config::{CircuitBreakerConfig, CircuitBreakerConfigBuilder};
pub use error::CircuitBreakerError;
pub use events::CircuitBreakerEvent;

/// A circuit breaker guarding calls to a single tier.
pub struct CircuitBreaker {
    circuit: Mutex<Circuit>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    /// Creates a new breaker, starting Closed.
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            circuit: Mutex::new(Circuit::new()),
            config,
        }
    }

    /// Checks whether a call is currently permitted. Returns
    /// `Err(CircuitBreakerError::Open)` without side effects beyond the
    /// rejection bookkeeping if the breaker is tripped.
    pub fn try_acquire(&self) -> Result<(), CircuitBreakerError> {
        let mut circuit = self.circuit.lock();
        if circuit.try_acquire(&self.config) {
            Ok(())
        } else {
            Err(CircuitBreakerError::Open {
                tier: self.config.tier_name.clone(),
            })
        }
    }

    /// Records a successful call outcome.
    pub fn record_success(&self) {
        self.circuit.lock().record_success(&self.config);
    }

    /// Records a failed call outcome.
    pub fn record_failure(&self) {
        self.circuit.lock().record_failure(&self.config);
    }

    /// Returns the current state.
    pub fn state(&self) -> CircuitState {
        self.circuit.lock().state()
    }

    /// Returns a snapshot of the breaker's counters, for `circuit_status()`.
    pub fn metrics(&self) -> CircuitMetrics {
        self.circuit.lock().metrics()
    }

    /// Forces the breaker open regardless of its failure count.
    pub fn force_open(&self) {
        self.circuit.lock().force_open(&self.config);
    }

    /// Forces the breaker closed and clears its counters.
    pub fn force_closed(&self) {
        self.circuit.lock().force_closed(&self.config);
    }

    /// Resets the breaker to Closed with cleared counters.
    pub fn reset(&self) {
        self.circuit.lock().reset(&self.config);
    }

    /// The name of the tier this breaker guards.
    pub fn tier_name(&self) -> &str {
        &self.config.tier_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn blocks_calls_once_open_and_reports_tier_name() {
        let breaker = CircuitBreaker::new(CircuitBreakerConfig::origin_defaults());

        assert!(breaker.try_acquire().is_ok());
        breaker.record_failure();
        breaker.record_failure();

        assert_eq!(breaker.state(), CircuitState::Open);
        let err = breaker.try_acquire().unwrap_err();
        assert_eq!(err.tier(), "origin");
    }

    #[test]
    fn on_state_transition_callback_fires() {
        let transitions = Arc::new(AtomicUsize::new(0));
        let transitions_clone = Arc::clone(&transitions);

        let config = CircuitBreakerConfig::builder("memory")
            .failure_threshold(2)
            .on_state_transition(move |_from, _to| {
                transitions_clone.fetch_add(1, Ordering::SeqCst);
            })
            .build();
        let breaker = CircuitBreaker::new(config);

        breaker.record_failure();
        breaker.record_failure();

        assert_eq!(transitions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn per_tier_defaults_match_tuning_table() {
        let memory = CircuitBreakerConfig::memory_defaults();
        let persistent = CircuitBreakerConfig::persistent_defaults();
        let origin = CircuitBreakerConfig::origin_defaults();

        assert_eq!(memory.failure_threshold, 5);
        assert_eq!(memory.open_timeout, std::time::Duration::from_secs(30));

        assert_eq!(persistent.failure_threshold, 3);
        assert_eq!(persistent.open_timeout, std::time::Duration::from_secs(60));

        assert_eq!(origin.failure_threshold, 2);
        assert_eq!(origin.open_timeout, std::time::Duration::from_secs(120));
        assert_eq!(origin.success_threshold, 3);
    }
}
