//! Circuit breaker metrics regression tests.

use super::helpers::*;
use hybridcache_circuitbreaker::{CircuitBreaker, CircuitBreakerConfig};
use serial_test::serial;

#[test]
#[serial]
fn circuit_calls_metrics_exist() {
    init_recorder();

    let breaker = CircuitBreaker::new(
        CircuitBreakerConfig::builder("metrics_cb")
            .failure_threshold(2)
            .success_threshold(1)
            .build(),
    );

    breaker.try_acquire().unwrap();
    breaker.record_success();

    breaker.try_acquire().unwrap();
    breaker.record_failure();
    breaker.try_acquire().unwrap();
    breaker.record_failure();

    // Breaker is now Open; the next acquire is rejected.
    assert!(breaker.try_acquire().is_err());

    assert_counter_exists("hybridcache_circuit_calls_total");
    assert_metric_has_label("hybridcache_circuit_calls_total", "tier", "metrics_cb");
    assert_metric_has_label("hybridcache_circuit_calls_total", "outcome", "success");
    assert_metric_has_label("hybridcache_circuit_calls_total", "outcome", "failure");
    assert_metric_has_label("hybridcache_circuit_calls_total", "outcome", "rejected");
}

#[test]
#[serial]
fn circuit_state_gauge_reflects_the_open_transition() {
    init_recorder();

    let breaker = CircuitBreaker::new(
        CircuitBreakerConfig::builder("metrics_cb_state")
            .failure_threshold(1)
            .build(),
    );

    breaker.try_acquire().unwrap();
    breaker.record_failure();

    assert_gauge_exists("hybridcache_circuit_state");
    assert_metric_has_label("hybridcache_circuit_state", "tier", "metrics_cb_state");
    assert_metric_has_label("hybridcache_circuit_state", "state", "open");
}
