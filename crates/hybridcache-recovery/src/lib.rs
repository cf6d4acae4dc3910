//! Retry and recovery for a single tier's operations.
//!
//! A [`RecoveryManager`] wraps calls into one tier with the tier's
//! [`CircuitBreaker`](hybridcache_circuitbreaker::CircuitBreaker): before every
//! attempt it checks the breaker, and after every attempt it reports the
//! outcome back so consecutive failures trip the breaker open. Errors are
//! classified terminal/retryable by a caller-supplied classifier; terminal
//! errors stop the loop immediately, retryable ones back off and try again up
//! to `max_retries`.
//!
//! ```
//! use hybridcache_circuitbreaker::{CircuitBreaker, CircuitBreakerConfig};
//! use hybridcache_core::EngineError;
//! use hybridcache_recovery::{RecoveryConfig, RecoveryManager};
//!
//! # async fn example() {
//! let breaker = CircuitBreaker::new(CircuitBreakerConfig::origin_defaults());
//! let manager = RecoveryManager::for_engine_errors(RecoveryConfig::builder("origin").build());
//!
//! let result = manager
//!     .execute(&breaker, "tool:weather", || async { Ok::<_, EngineError>(42) })
//!     .await;
//! assert_eq!(result.unwrap(), 42);
//! # }
//! ```

mod backoff;
mod config;
mod error;
mod events;

use hybridcache_circuitbreaker::CircuitBreaker;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

pub use backoff::{ExponentialBackoff, FixedInterval, IntervalFunction};
pub use config::{RecoveryConfig, RecoveryConfigBuilder, RetryStrategy};
pub use error::RecoveryError;
pub use events::RecoveryEvent;

/// How a `RecoveryManager` should respond to a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Retrying cannot help (auth failure, malformed input, ...); stop now.
    Terminal,
    /// A transient condition; worth another attempt.
    Retryable,
    /// Not recognized by the classifier; treated as retryable but recorded
    /// distinctly so operators can see unexpected error shapes.
    Unknown,
}

/// One entry in a tier's ring of recent errors.
#[derive(Debug, Clone)]
pub struct ErrorRingEntry {
    pub timestamp: Instant,
    pub message: String,
}

/// Drives the retry loop for a single tier, interlocked with that tier's
/// [`CircuitBreaker`].
pub struct RecoveryManager<E> {
    config: RecoveryConfig,
    classifier: Arc<dyn Fn(&E) -> ErrorClass + Send + Sync>,
    error_ring: Mutex<VecDeque<ErrorRingEntry>>,
}

impl RecoveryManager<hybridcache_core::EngineError> {
    /// Convenience constructor using `EngineError`'s own
    /// `is_terminal`/`is_retryable` predicates as the classifier.
    pub fn for_engine_errors(config: RecoveryConfig) -> Self {
        Self::new(config, |err: &hybridcache_core::EngineError| {
            if err.is_terminal() {
                ErrorClass::Terminal
            } else if err.is_retryable() {
                ErrorClass::Retryable
            } else {
                ErrorClass::Unknown
            }
        })
    }
}

impl<E> RecoveryManager<E>
where
    E: fmt::Display + Send + Sync + 'static,
{
    /// Creates a manager with a custom error classifier.
    pub fn new<C>(config: RecoveryConfig, classifier: C) -> Self
    where
        C: Fn(&E) -> ErrorClass + Send + Sync + 'static,
    {
        let capacity = config.error_ring_capacity;
        Self {
            config,
            classifier: Arc::new(classifier),
            error_ring: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// The tier this manager guards.
    pub fn tier_name(&self) -> &str {
        &self.config.tier_name
    }

    /// Runs `op`, retrying on retryable failures per the configured strategy
    /// and consulting `circuit` before every attempt.
    ///
    /// `op` is called again on every retry, so it must be re-runnable (an
    /// `Fn`, not `FnOnce`) — typically a closure that captures a reference
    /// and performs the tier call fresh each time.
    pub async fn execute<T, F, Fut>(
        &self,
        circuit: &CircuitBreaker,
        key: &str,
        op: F,
    ) -> Result<T, RecoveryError<E>>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt: u32 = 0;

        loop {
            if circuit.try_acquire().is_err() {
                self.emit(RecoveryEvent::CircuitOpenSkipped {
                    tier_name: self.config.tier_name.clone(),
                    timestamp: Instant::now(),
                });
                return Err(RecoveryError::CircuitOpen {
                    tier: self.config.tier_name.clone(),
                });
            }

            match op().await {
                Ok(value) => {
                    circuit.record_success();
                    self.emit(RecoveryEvent::Success {
                        tier_name: self.config.tier_name.clone(),
                        timestamp: Instant::now(),
                        attempts: attempt + 1,
                    });
                    #[cfg(feature = "metrics")]
                    metrics::counter!("hybridcache_recovery_success_total", "tier" => self.config.tier_name.clone()).increment(1);
                    return Ok(value);
                }
                Err(err) => {
                    circuit.record_failure();
                    self.record_error(&err);

                    let class = (self.classifier)(&err);
                    if class == ErrorClass::Terminal {
                        self.emit(RecoveryEvent::TerminalError {
                            tier_name: self.config.tier_name.clone(),
                            timestamp: Instant::now(),
                        });
                        return Err(RecoveryError::Exhausted {
                            key: key.to_string(),
                            tier: self.config.tier_name.clone(),
                            attempts: attempt + 1,
                            last_error: err,
                        });
                    }

                    if attempt >= self.config.strategy.max_retries() {
                        self.emit(RecoveryEvent::Exhausted {
                            tier_name: self.config.tier_name.clone(),
                            timestamp: Instant::now(),
                            attempts: attempt + 1,
                        });
                        #[cfg(feature = "metrics")]
                        metrics::counter!("hybridcache_recovery_exhausted_total", "tier" => self.config.tier_name.clone()).increment(1);
                        return Err(RecoveryError::Exhausted {
                            key: key.to_string(),
                            tier: self.config.tier_name.clone(),
                            attempts: attempt + 1,
                            last_error: err,
                        });
                    }

                    attempt += 1;
                    let delay = self.config.strategy.delay_for_attempt(attempt);
                    self.emit(RecoveryEvent::Retry {
                        tier_name: self.config.tier_name.clone(),
                        timestamp: Instant::now(),
                        attempt,
                        delay,
                    });
                    #[cfg(feature = "metrics")]
                    metrics::counter!("hybridcache_recovery_retry_total", "tier" => self.config.tier_name.clone()).increment(1);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Like [`execute`](Self::execute), but runs `fallback` instead of
    /// surfacing the error when every attempt (or the circuit breaker) fails.
    pub async fn execute_with_fallback<T, F, Fut, FB, FutFB>(
        &self,
        circuit: &CircuitBreaker,
        key: &str,
        op: F,
        fallback: FB,
    ) -> T
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        FB: FnOnce(RecoveryError<E>) -> FutFB,
        FutFB: Future<Output = T>,
    {
        match self.execute(circuit, key, op).await {
            Ok(value) => value,
            Err(err) => fallback(err).await,
        }
    }

    /// A snapshot of the last `error_ring_capacity` errors recorded for this
    /// tier, oldest first.
    pub fn recent_errors(&self) -> Vec<ErrorRingEntry> {
        self.error_ring.lock().iter().cloned().collect()
    }

    fn record_error(&self, err: &E) {
        let mut ring = self.error_ring.lock();
        if ring.len() >= self.config.error_ring_capacity {
            ring.pop_front();
        }
        ring.push_back(ErrorRingEntry {
            timestamp: Instant::now(),
            message: err.to_string(),
        });
    }

    fn emit(&self, event: RecoveryEvent) {
        self.config.event_listeners.emit(&event);
    }
}
