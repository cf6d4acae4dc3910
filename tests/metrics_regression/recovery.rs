//! Recovery-manager metrics regression tests.

use super::helpers::*;
use hybridcache_circuitbreaker::{CircuitBreaker, CircuitBreakerConfig};
use hybridcache_recovery::{ErrorClass, RecoveryConfig, RecoveryManager};
use serial_test::serial;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug)]
struct Flaky;

impl std::fmt::Display for Flaky {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "flaky")
    }
}

#[tokio::test]
#[serial]
async fn recovery_counters_exist_across_success_retry_and_exhaustion() {
    init_recorder();

    let breaker = CircuitBreaker::new(CircuitBreakerConfig::builder("metrics_recovery").failure_threshold(100).build());
    let manager = RecoveryManager::new(
        RecoveryConfig::builder("metrics_recovery").max_retries(1).build(),
        |_: &Flaky| ErrorClass::Retryable,
    );

    manager.execute(&breaker, "k1", || async { Ok::<_, Flaky>(()) }).await.unwrap();

    let calls = AtomicUsize::new(0);
    let _ = manager
        .execute(&breaker, "k2", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(Flaky) }
        })
        .await;

    assert_counter_exists("hybridcache_recovery_success_total");
    assert_metric_has_label("hybridcache_recovery_success_total", "tier", "metrics_recovery");
    assert_counter_exists("hybridcache_recovery_retry_total");
    assert_counter_exists("hybridcache_recovery_exhausted_total");
}
