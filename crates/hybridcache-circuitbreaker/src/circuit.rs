use crate::config::CircuitBreakerConfig;
use crate::events::CircuitBreakerEvent;
#[cfg(feature = "metrics")]
use metrics::{counter, gauge};
use std::time::Instant;

/// State of a per-tier circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls pass through normally.
    Closed,
    /// Calls are rejected immediately.
    Open,
    /// A single probe call is allowed through to test recovery.
    HalfOpen,
}

/// Point-in-time view of a breaker's counters, for `circuit_status()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitMetrics {
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub half_open_probes_succeeded: u32,
    pub open_since: Option<Instant>,
}

pub(crate) struct Circuit {
    state: CircuitState,
    consecutive_failures: u32,
    half_open_probes_succeeded: u32,
    open_since: Option<Instant>,
    half_open_probe_in_flight: bool,
}

impl Circuit {
    pub(crate) fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            half_open_probes_succeeded: 0,
            open_since: None,
            half_open_probe_in_flight: false,
        }
    }

    pub(crate) fn state(&self) -> CircuitState {
        self.state
    }

    pub(crate) fn metrics(&self) -> CircuitMetrics {
        CircuitMetrics {
            state: self.state,
            consecutive_failures: self.consecutive_failures,
            half_open_probes_succeeded: self.half_open_probes_succeeded,
            open_since: self.open_since,
        }
    }

    /// Returns true if a call is currently permitted, transitioning
    /// Open → HalfOpen when `open_timeout` has elapsed.
    pub(crate) fn try_acquire(&mut self, config: &CircuitBreakerConfig) -> bool {
        match self.state {
            CircuitState::Closed => {
                self.emit_permitted(config);
                true
            }
            CircuitState::Open => {
                let elapsed = self
                    .open_since
                    .map(|since| since.elapsed() >= config.open_timeout)
                    .unwrap_or(false);

                if elapsed {
                    self.transition_to(CircuitState::HalfOpen, config);
                    self.half_open_probe_in_flight = true;
                    self.emit_permitted(config);
                    true
                } else {
                    self.emit_rejected(config);
                    false
                }
            }
            CircuitState::HalfOpen => {
                if self.half_open_probe_in_flight {
                    self.emit_rejected(config);
                    false
                } else {
                    self.half_open_probe_in_flight = true;
                    self.emit_permitted(config);
                    true
                }
            }
        }
    }

    pub(crate) fn record_success(&mut self, config: &CircuitBreakerConfig) {
        self.half_open_probe_in_flight = false;

        config
            .event_listeners
            .emit(&CircuitBreakerEvent::SuccessRecorded {
                tier_name: config.tier_name.clone(),
                timestamp: Instant::now(),
                state: self.state,
            });

        #[cfg(feature = "metrics")]
        counter!("hybridcache_circuit_calls_total", "tier" => config.tier_name.clone(), "outcome" => "success")
            .increment(1);

        match self.state {
            CircuitState::Closed => {
                self.consecutive_failures = 0;
            }
            CircuitState::HalfOpen => {
                self.half_open_probes_succeeded += 1;
                if self.half_open_probes_succeeded >= config.success_threshold {
                    self.transition_to(CircuitState::Closed, config);
                }
            }
            CircuitState::Open => {}
        }
    }

    pub(crate) fn record_failure(&mut self, config: &CircuitBreakerConfig) {
        self.half_open_probe_in_flight = false;

        config
            .event_listeners
            .emit(&CircuitBreakerEvent::FailureRecorded {
                tier_name: config.tier_name.clone(),
                timestamp: Instant::now(),
                state: self.state,
            });

        #[cfg(feature = "metrics")]
        counter!("hybridcache_circuit_calls_total", "tier" => config.tier_name.clone(), "outcome" => "failure")
            .increment(1);

        match self.state {
            CircuitState::Closed => {
                self.consecutive_failures += 1;
                if self.consecutive_failures >= config.failure_threshold {
                    self.transition_to(CircuitState::Open, config);
                }
            }
            CircuitState::HalfOpen => {
                self.transition_to(CircuitState::Open, config);
            }
            CircuitState::Open => {}
        }
    }

    pub(crate) fn force_open(&mut self, config: &CircuitBreakerConfig) {
        self.transition_to(CircuitState::Open, config);
    }

    pub(crate) fn force_closed(&mut self, config: &CircuitBreakerConfig) {
        self.transition_to(CircuitState::Closed, config);
    }

    pub(crate) fn reset(&mut self, config: &CircuitBreakerConfig) {
        self.transition_to(CircuitState::Closed, config);
    }

    fn emit_permitted(&self, config: &CircuitBreakerConfig) {
        config
            .event_listeners
            .emit(&CircuitBreakerEvent::CallPermitted {
                tier_name: config.tier_name.clone(),
                timestamp: Instant::now(),
                state: self.state,
            });
    }

    fn emit_rejected(&self, config: &CircuitBreakerConfig) {
        config
            .event_listeners
            .emit(&CircuitBreakerEvent::CallRejected {
                tier_name: config.tier_name.clone(),
                timestamp: Instant::now(),
            });

        #[cfg(feature = "metrics")]
        counter!("hybridcache_circuit_calls_total", "tier" => config.tier_name.clone(), "outcome" => "rejected")
            .increment(1);
    }

    fn transition_to(&mut self, state: CircuitState, config: &CircuitBreakerConfig) {
        if self.state == state {
            return;
        }

        let from_state = self.state;

        config
            .event_listeners
            .emit(&CircuitBreakerEvent::StateTransition {
                tier_name: config.tier_name.clone(),
                timestamp: Instant::now(),
                from_state,
                to_state: state,
            });

        #[cfg(feature = "tracing")]
        tracing::info!(
            tier = %config.tier_name,
            from = ?from_state,
            to = ?state,
            "circuit breaker state transition"
        );

        #[cfg(feature = "metrics")]
        {
            let state_label = match state {
                CircuitState::Closed => "closed",
                CircuitState::Open => "open",
                CircuitState::HalfOpen => "half_open",
            };
            gauge!("hybridcache_circuit_state", "tier" => config.tier_name.clone(), "state" => state_label)
                .set(1.0);
        }

        self.state = state;
        self.consecutive_failures = 0;
        self.half_open_probes_succeeded = 0;
        self.half_open_probe_in_flight = false;
        self.open_since = if state == CircuitState::Open {
            Some(Instant::now())
        } else {
            None
        };
    }
}
