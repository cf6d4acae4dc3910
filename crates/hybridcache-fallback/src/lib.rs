//! Fallback chain across a hybridcache engine's storage tiers.
//!
//! A [`FallbackChainHandler`] walks memory, persistent, and origin tiers in
//! order for one key: each tier call is guarded by that tier's
//! [`CircuitBreaker`](hybridcache_circuitbreaker::CircuitBreaker) through a
//! [`RecoveryManager`](hybridcache_recovery::RecoveryManager) running a
//! shorter retry budget than any tier's own tuning, and raced against a
//! per-call deadline. A record with every required field present is always
//! servable, marked partial only as an informational note if some optional
//! field is still missing. A record missing a *required* field triggers a
//! single completion fetch against the tier named `"origin"`, merging in
//! whatever that recovers; if it's still incomplete afterward, the merged
//! record is served anyway with the remaining gaps filled by synthesized
//! defaults and marked partial — unless `partial_acceptable` is false, in
//! which case the chain moves on to the next tier. If every tier fails or
//! comes back unusable, an emergency stale pass re-queries each tier via
//! [`Tier::get_stale`](hybridcache_tiers::Tier::get_stale) for a copy no
//! older than the caller's `max_stale_age`. Only once that also finds
//! nothing does the call fail with
//! [`EngineError::AllTiersFailed`](hybridcache_core::EngineError::AllTiersFailed).
//!
//! ```
//! # use hybridcache_circuitbreaker::{CircuitBreaker, CircuitBreakerConfig};
//! # use hybridcache_fallback::{FallbackChainHandler, FallbackOptions, FallbackTier};
//! # use hybridcache_tiers::{MemoryTier, MemoryTierConfig};
//! # use std::sync::Arc;
//! # async fn example() {
//! let memory = Arc::new(MemoryTier::new(MemoryTierConfig::default()));
//! let tier = FallbackTier::new(memory, CircuitBreaker::new(CircuitBreakerConfig::memory_defaults()));
//! let handler = FallbackChainHandler::new(vec![tier]);
//!
//! let result = handler.get_with_fallback("component:react:button", &FallbackOptions::default()).await;
//! assert!(result.is_err()); // nothing stored yet
//! # }
//! ```

mod config;
mod events;

pub use config::{FallbackOptions, FallbackOptionsBuilder};
pub use events::FallbackEvent;

use hybridcache_circuitbreaker::{CircuitBreaker, CircuitMetrics};
use hybridcache_core::events::EventListeners;
use hybridcache_core::EngineError;
use hybridcache_notifier::{DegradedNotifier, Notification, NotificationKind, Severity};
use hybridcache_recovery::{ErrorClass, ExponentialBackoff, RecoveryConfig, RecoveryError, RecoveryManager, RetryStrategy};
use hybridcache_tiers::{CacheValue, Completeness, PartialResponseHandler, Tier, TierError};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The reduced retry budget the fallback chain uses for every tier call:
/// tighter than any single tier's own tuning, because a slow fallback
/// defeats the purpose of having one.
fn fallback_retry_strategy() -> RetryStrategy {
    RetryStrategy::default_tuning()
        .with_max_retries(2)
        .with_interval(ExponentialBackoff::new(Duration::from_millis(500)).with_max_interval(Duration::from_millis(5_000)))
}

/// One tier in the chain: its storage, its circuit breaker, and the
/// recovery manager that guards calls to it.
pub struct FallbackTier {
    tier: Arc<dyn Tier>,
    breaker: CircuitBreaker,
    recovery: RecoveryManager<TierError>,
}

impl FallbackTier {
    pub fn new(tier: Arc<dyn Tier>, breaker: CircuitBreaker) -> Self {
        let recovery = RecoveryManager::new(
            RecoveryConfig::builder(tier.name()).strategy(fallback_retry_strategy()).build(),
            |err: &TierError| {
                if err.is_terminal() {
                    ErrorClass::Terminal
                } else if err.is_retryable() {
                    ErrorClass::Retryable
                } else {
                    ErrorClass::Unknown
                }
            },
        );
        Self { tier, breaker, recovery }
    }

    pub fn name(&self) -> &str {
        self.tier.name()
    }

    pub fn circuit_metrics(&self) -> CircuitMetrics {
        self.breaker.metrics()
    }
}

/// Walks an ordered set of tiers for one key, applying retries, circuit
/// breaking, partial-response acceptance, and emergency staleness.
pub struct FallbackChainHandler {
    tiers: Vec<FallbackTier>,
    notifier: Option<DegradedNotifier>,
    event_listeners: EventListeners<FallbackEvent>,
}

impl FallbackChainHandler {
    pub fn new(tiers: Vec<FallbackTier>) -> Self {
        Self { tiers, notifier: None, event_listeners: EventListeners::new() }
    }

    pub fn with_notifier(mut self, notifier: DegradedNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_event_listeners(mut self, listeners: EventListeners<FallbackEvent>) -> Self {
        self.event_listeners = listeners;
        self
    }

    /// Names of every tier this handler was built with, in construction
    /// order.
    pub fn tier_names(&self) -> Vec<String> {
        self.tiers.iter().map(|t| t.name().to_string()).collect()
    }

    /// A snapshot of each tier's circuit breaker, keyed by tier name.
    pub fn circuit_status(&self) -> std::collections::HashMap<String, CircuitMetrics> {
        self.tiers.iter().map(|t| (t.name().to_string(), t.circuit_metrics())).collect()
    }

    fn selected_tiers(&self, options: &FallbackOptions) -> Vec<&FallbackTier> {
        match &options.tiers {
            Some(names) => names.iter().filter_map(|name| self.tiers.iter().find(|t| t.name() == name)).collect(),
            None => self.tiers.iter().collect(),
        }
    }

    /// Resolves `key` by walking the selected tiers in order.
    pub async fn get_with_fallback(&self, key: &str, options: &FallbackOptions) -> Result<CacheValue, EngineError> {
        let selected = self.selected_tiers(options);
        let mut attempted = Vec::with_capacity(selected.len());

        for entry in &selected {
            attempted.push(entry.name().to_string());
            if let Some(value) = self.try_tier(entry, key, options).await {
                return Ok(value);
            }
        }

        if options.allow_stale {
            for entry in &selected {
                if let Ok(stored) = entry.tier.get_stale(key, options.max_stale_age).await {
                    let age = stored.meta.age();
                    self.notify(
                        NotificationKind::ServingStale,
                        entry.name(),
                        Severity::Warning,
                        format!("serving stale value for '{key}', age {}s", age.as_secs()),
                        key,
                    );
                    self.event_listeners.emit(&FallbackEvent::ServingStale {
                        tier: entry.name().to_string(),
                        timestamp: Instant::now(),
                        key: key.to_string(),
                        age,
                    });
                    return Ok(stored.value);
                }
            }
        }

        self.event_listeners.emit(&FallbackEvent::AllTiersExhausted {
            timestamp: Instant::now(),
            key: key.to_string(),
            attempted: attempted.clone(),
        });
        Err(EngineError::AllTiersFailed { key: key.to_string(), attempted })
    }

    /// Attempts one tier. Returns `None` if the tier failed, timed out, or
    /// returned a value the caller can't accept — in every such case the
    /// chain should move on to the next tier.
    async fn try_tier(&self, entry: &FallbackTier, key: &str, options: &FallbackOptions) -> Option<CacheValue> {
        let attempt = entry.recovery.execute(&entry.breaker, key, || entry.tier.get(key));
        let stored = match tokio::time::timeout(options.timeout, attempt).await {
            Ok(Ok(stored)) => stored,
            Ok(Err(RecoveryError::Exhausted { last_error: TierError::NotFound, .. })) => {
                // A plain miss is not a failure worth notifying on; the
                // chain just moves on to the next tier.
                return None;
            }
            Ok(Err(err)) => {
                self.notify_tier_failed(entry.name(), key, &err.to_string());
                return None;
            }
            Err(_) => {
                self.notify_tier_failed(entry.name(), key, "call timed out");
                return None;
            }
        };

        let required_override = options.required_fields.as_deref();
        match evaluate_completeness(&stored.value, required_override) {
            Completeness::Complete { missing_optional } => {
                self.event_listeners.emit(&FallbackEvent::TierHit {
                    tier: entry.name().to_string(),
                    timestamp: Instant::now(),
                    key: key.to_string(),
                });
                Some(self.mark_if_missing_optional(entry, key, stored.value, missing_optional))
            }
            Completeness::Incomplete { missing_required } => {
                self.repair_incomplete(entry, key, stored.value, missing_required, options).await
            }
        }
    }

    fn mark_if_missing_optional(&self, entry: &FallbackTier, key: &str, value: CacheValue, missing_optional: Vec<String>) -> CacheValue {
        if missing_optional.is_empty() {
            return value;
        }
        self.notify(
            NotificationKind::PartialData,
            entry.name(),
            Severity::Info,
            format!("serving value for '{key}' missing optional field(s) {missing_optional:?}"),
            key,
        );
        self.event_listeners.emit(&FallbackEvent::ServingPartial {
            tier: entry.name().to_string(),
            timestamp: Instant::now(),
            key: key.to_string(),
            missing_fields: missing_optional.clone(),
        });
        value.mark_partial(&missing_optional)
    }

    /// `value` is missing one or more required fields. Issues a single
    /// completion fetch against the tier named `"origin"` (skipped if
    /// `entry` itself is that tier — nothing more to recover from it) and
    /// merges any recovered fields in. If the merged record is still
    /// incomplete, serves it anyway with synthesized defaults for the
    /// remaining gaps, marked partial — unless `partial_acceptable` is
    /// false, in which case the chain moves on to the next tier.
    async fn repair_incomplete(
        &self,
        entry: &FallbackTier,
        key: &str,
        value: CacheValue,
        missing_required: Vec<String>,
        options: &FallbackOptions,
    ) -> Option<CacheValue> {
        let repaired = match self.origin_tier() {
            Some(origin) if !std::ptr::eq(origin, entry) => match origin.tier.get(key).await {
                Ok(fetched) => value.merge_missing_from(&fetched.value),
                Err(_) => value,
            },
            _ => value,
        };

        match PartialResponseHandler::evaluate(&repaired) {
            Completeness::Complete { missing_optional } => {
                self.event_listeners.emit(&FallbackEvent::TierHit {
                    tier: entry.name().to_string(),
                    timestamp: Instant::now(),
                    key: key.to_string(),
                });
                Some(self.mark_if_missing_optional(entry, key, repaired, missing_optional))
            }
            Completeness::Incomplete { missing_required } => {
                if !options.partial_acceptable {
                    return None;
                }
                let served = repaired.synthesize_defaults(&missing_required).mark_partial(&missing_required);
                self.notify(
                    NotificationKind::PartialData,
                    entry.name(),
                    Severity::Warning,
                    format!("serving '{key}' with synthesized defaults; still missing {missing_required:?} after completion fetch"),
                    key,
                );
                self.event_listeners.emit(&FallbackEvent::ServingPartial {
                    tier: entry.name().to_string(),
                    timestamp: Instant::now(),
                    key: key.to_string(),
                    missing_fields: missing_required,
                });
                Some(served)
            }
        }
    }

    fn origin_tier(&self) -> Option<&FallbackTier> {
        self.tiers.iter().find(|t| t.name() == "origin")
    }

    fn notify_tier_failed(&self, tier: &str, key: &str, reason: &str) {
        self.notify(NotificationKind::StorageFailure, tier, Severity::Warning, format!("tier '{tier}' failed for '{key}': {reason}"), key);
        self.event_listeners.emit(&FallbackEvent::TierFailed {
            tier: tier.to_string(),
            timestamp: Instant::now(),
            key: key.to_string(),
            reason: reason.to_string(),
        });
    }

    fn notify(&self, kind: NotificationKind, tier: &str, severity: Severity, message: impl Into<String>, key: &str) {
        if let Some(notifier) = &self.notifier {
            notifier.notify(Notification::new(kind, tier, severity, message).with_key(key));
        }
    }
}

/// Applies `required_fields` as an override to the value's own field
/// requirements, when present, otherwise defers to
/// [`PartialResponseHandler::evaluate`].
fn evaluate_completeness(value: &CacheValue, required_override: Option<&[String]>) -> Completeness {
    let Some(required) = required_override else {
        return PartialResponseHandler::evaluate(value);
    };

    let missing_required = value.missing_named_fields(required);
    if missing_required.is_empty() {
        Completeness::Complete { missing_optional: Vec::new() }
    } else {
        Completeness::Incomplete { missing_required }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hybridcache_circuitbreaker::CircuitBreakerConfig;
    use hybridcache_tiers::{EntryMeta, MemoryTier, MemoryTierConfig, StoredEntry};
    use std::sync::Mutex as StdMutex;

    fn memory_tier() -> FallbackTier {
        let memory = Arc::new(MemoryTier::new(MemoryTierConfig::default()));
        FallbackTier::new(memory, CircuitBreaker::new(CircuitBreakerConfig::memory_defaults()))
    }

    fn component_entry(name: Option<&str>, code: Option<&str>, demo: Option<&str>, ttl_seconds: u64) -> StoredEntry {
        let value = CacheValue::Component {
            name: name.map(str::to_string),
            code: code.map(str::to_string),
            demo: demo.map(str::to_string),
            metadata: Some(serde_json::json!({})),
            dependencies: Some(Vec::new()),
            partial: false,
            missing_fields: Vec::new(),
        };
        let size = value.size_bytes();
        StoredEntry { value, meta: EntryMeta::new(size, ttl_seconds, "memory") }
    }

    /// A read-only test double standing in for the origin tier a completion
    /// fetch targets by name.
    struct StubOriginTier {
        value: CacheValue,
    }

    #[async_trait::async_trait]
    impl Tier for StubOriginTier {
        fn name(&self) -> &str {
            "origin"
        }
        async fn get(&self, _key: &str) -> Result<StoredEntry, TierError> {
            let size = self.value.size_bytes();
            Ok(StoredEntry { value: self.value.clone(), meta: EntryMeta::new(size, 0, "origin") })
        }
        async fn set(&self, _key: &str, _entry: StoredEntry) -> Result<(), TierError> {
            Ok(())
        }
        async fn delete(&self, _key: &str) -> Result<(), TierError> {
            Ok(())
        }
        async fn has(&self, _key: &str) -> Result<bool, TierError> {
            Ok(true)
        }
        async fn keys(&self, _pattern: &str) -> Result<Vec<String>, TierError> {
            Ok(vec![])
        }
        async fn mget(&self, keys: &[String]) -> Result<Vec<Option<StoredEntry>>, TierError> {
            Ok(keys.iter().map(|_| None).collect())
        }
        async fn mset(&self, _entries: Vec<(String, StoredEntry)>) -> Result<(), TierError> {
            Ok(())
        }
        async fn metadata(&self, _key: &str) -> Result<Option<StoredEntry>, TierError> {
            Ok(None)
        }
        async fn size(&self) -> Result<usize, TierError> {
            Ok(0)
        }
        async fn cleanup(&self) -> Result<(), TierError> {
            Ok(())
        }
        async fn dispose(&self) -> Result<(), TierError> {
            Ok(())
        }
    }

    fn origin_tier(value: CacheValue) -> FallbackTier {
        FallbackTier::new(Arc::new(StubOriginTier { value }), CircuitBreaker::new(CircuitBreakerConfig::origin_defaults()))
    }

    #[tokio::test]
    async fn returns_complete_value_from_first_tier() {
        let memory = Arc::new(MemoryTier::new(MemoryTierConfig::default()));
        memory.set("k1", component_entry(Some("button"), Some("..."), Some("..."), 0)).await.unwrap();
        let tier = FallbackTier::new(memory, CircuitBreaker::new(CircuitBreakerConfig::memory_defaults()));

        let handler = FallbackChainHandler::new(vec![tier]);
        let result = handler.get_with_fallback("k1", &FallbackOptions::default()).await.unwrap();
        assert!(!result.is_partial());
    }

    #[tokio::test]
    async fn falls_through_to_second_tier_on_miss() {
        let empty = memory_tier();
        let memory2 = Arc::new(MemoryTier::new(MemoryTierConfig::default()));
        memory2.set("k1", component_entry(Some("button"), Some("..."), Some("..."), 0)).await.unwrap();
        let second = FallbackTier::new(memory2, CircuitBreaker::new(CircuitBreakerConfig::memory_defaults()));

        let handler = FallbackChainHandler::new(vec![empty, second]);
        let result = handler.get_with_fallback("k1", &FallbackOptions::default()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn record_missing_only_an_optional_field_is_still_served_and_marked() {
        let memory = Arc::new(MemoryTier::new(MemoryTierConfig::default()));
        memory.set("k1", component_entry(Some("button"), Some("..."), None, 0)).await.unwrap();
        let tier = FallbackTier::new(memory, CircuitBreaker::new(CircuitBreakerConfig::memory_defaults()));

        let handler = FallbackChainHandler::new(vec![tier]);
        let result = handler.get_with_fallback("k1", &FallbackOptions::default()).await.unwrap();
        assert!(result.is_partial());
        assert_eq!(result.missing_fields(), vec!["demo".to_string()]);
    }

    #[tokio::test]
    async fn record_missing_only_an_optional_field_is_served_even_when_partial_is_unacceptable() {
        // Missing-optional never downgrades a record out of Complete, so it
        // must still be served regardless of `partial_acceptable`.
        let memory = Arc::new(MemoryTier::new(MemoryTierConfig::default()));
        memory.set("k1", component_entry(Some("button"), Some("..."), None, 0)).await.unwrap();
        let tier = FallbackTier::new(memory, CircuitBreaker::new(CircuitBreakerConfig::memory_defaults()));

        let handler = FallbackChainHandler::new(vec![tier]);
        let options = FallbackOptions::builder().partial_acceptable(false).build();
        let result = handler.get_with_fallback("k1", &options).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn missing_required_field_is_repaired_from_the_origin_tier() {
        let incomplete = Arc::new(MemoryTier::new(MemoryTierConfig::default()));
        incomplete.set("k1", component_entry(Some("button"), None, Some("<Button />"), 0)).await.unwrap();
        let first = FallbackTier::new(incomplete, CircuitBreaker::new(CircuitBreakerConfig::memory_defaults()));

        let origin_value = CacheValue::Component {
            name: Some("button".to_string()),
            code: Some("export default function Button() {}".to_string()),
            demo: None,
            metadata: None,
            dependencies: None,
            partial: false,
            missing_fields: Vec::new(),
        };
        let origin = origin_tier(origin_value);

        let handler = FallbackChainHandler::new(vec![first, origin]);
        let result = handler.get_with_fallback("k1", &FallbackOptions::default()).await.unwrap();
        assert!(!result.is_partial());
        match result {
            CacheValue::Component { code, demo, .. } => {
                assert_eq!(code, Some("export default function Button() {}".to_string()));
                assert_eq!(demo, Some("<Button />".to_string()));
            }
            other => panic!("expected Component, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn still_incomplete_after_repair_is_served_with_synthesized_defaults_when_acceptable() {
        let incomplete = Arc::new(MemoryTier::new(MemoryTierConfig::default()));
        incomplete.set("k1", component_entry(Some("button"), None, None, 0)).await.unwrap();
        let first = FallbackTier::new(incomplete, CircuitBreaker::new(CircuitBreakerConfig::memory_defaults()));

        // Origin's own record is just as incomplete; repair can't recover `code`.
        let origin_value = CacheValue::Component {
            name: Some("button".to_string()),
            code: None,
            demo: None,
            metadata: None,
            dependencies: None,
            partial: false,
            missing_fields: Vec::new(),
        };
        let origin = origin_tier(origin_value);

        let handler = FallbackChainHandler::new(vec![first, origin]);
        let result = handler.get_with_fallback("k1", &FallbackOptions::default()).await.unwrap();
        assert!(result.is_partial());
        assert_eq!(result.missing_fields(), vec!["code".to_string()]);
        match result {
            CacheValue::Component { code, .. } => assert_eq!(code, Some(String::new())),
            other => panic!("expected Component, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn still_incomplete_after_repair_is_skipped_when_partial_is_unacceptable() {
        let incomplete = Arc::new(MemoryTier::new(MemoryTierConfig::default()));
        incomplete.set("k1", component_entry(Some("button"), None, None, 0)).await.unwrap();
        let first = FallbackTier::new(incomplete, CircuitBreaker::new(CircuitBreakerConfig::memory_defaults()));

        let origin_value =
            CacheValue::Component { name: Some("button".to_string()), code: None, demo: None, metadata: None, dependencies: None, partial: false, missing_fields: Vec::new() };
        let origin = origin_tier(origin_value);

        let handler = FallbackChainHandler::new(vec![first, origin]);
        let options = FallbackOptions::builder().partial_acceptable(false).allow_stale(false).build();
        let result = handler.get_with_fallback("k1", &options).await;
        assert!(matches!(result, Err(EngineError::AllTiersFailed { .. })));
    }

    #[tokio::test]
    async fn emergency_stale_pass_serves_an_expired_entry() {
        let memory = Arc::new(MemoryTier::new(MemoryTierConfig::default()));
        memory.set("k1", component_entry(Some("button"), Some("..."), Some("..."), 1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;
        let tier = FallbackTier::new(memory, CircuitBreaker::new(CircuitBreakerConfig::memory_defaults()));

        let handler = FallbackChainHandler::new(vec![tier]);
        let options = FallbackOptions::builder().max_stale_age(Duration::from_secs(3600)).build();
        let result = handler.get_with_fallback("k1", &options).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn disallowing_stale_raises_all_tiers_failed() {
        let memory = Arc::new(MemoryTier::new(MemoryTierConfig::default()));
        memory.set("k1", component_entry(Some("button"), Some("..."), Some("..."), 1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;
        let tier = FallbackTier::new(memory, CircuitBreaker::new(CircuitBreakerConfig::memory_defaults()));

        let handler = FallbackChainHandler::new(vec![tier]);
        let options = FallbackOptions::builder().allow_stale(false).build();
        let result = handler.get_with_fallback("k1", &options).await;
        assert!(matches!(result, Err(EngineError::AllTiersFailed { .. })));
    }

    #[tokio::test]
    async fn every_tier_missing_raises_all_tiers_failed_with_attempted_list() {
        let handler = FallbackChainHandler::new(vec![memory_tier(), memory_tier()]);
        let result = handler.get_with_fallback("missing", &FallbackOptions::default()).await;
        match result {
            Err(EngineError::AllTiersFailed { key, attempted }) => {
                assert_eq!(key, "missing");
                assert_eq!(attempted.len(), 2);
            }
            other => panic!("expected AllTiersFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn tiers_option_restricts_the_walk() {
        let memory = Arc::new(MemoryTier::new(MemoryTierConfig::default()));
        memory.set("k1", component_entry(Some("button"), Some("..."), Some("..."), 0)).await.unwrap();
        let first = FallbackTier::new(Arc::clone(&memory) as Arc<dyn Tier>, CircuitBreaker::new(CircuitBreakerConfig::memory_defaults()));
        let other = memory_tier();

        let handler = FallbackChainHandler::new(vec![first, other]);
        let options = FallbackOptions::builder().tiers(vec!["memory".to_string()]).build();
        let result = handler.get_with_fallback("k1", &options).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn event_listeners_observe_tier_hit() {
        let memory = Arc::new(MemoryTier::new(MemoryTierConfig::default()));
        memory.set("k1", component_entry(Some("button"), Some("..."), Some("..."), 0)).await.unwrap();
        let tier = FallbackTier::new(memory, CircuitBreaker::new(CircuitBreakerConfig::memory_defaults()));

        let seen = Arc::new(StdMutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let mut listeners = EventListeners::new();
        listeners.add(hybridcache_core::events::FnListener::new(move |event: &FallbackEvent| {
            seen_clone.lock().unwrap().push(event.event_type().to_string());
        }));

        let handler = FallbackChainHandler::new(vec![tier]).with_event_listeners(listeners);
        let _ = handler.get_with_fallback("k1", &FallbackOptions::default()).await;
        assert!(seen.lock().unwrap().contains(&"tier_hit".to_string()));
    }

    #[tokio::test]
    async fn plain_miss_does_not_raise_a_notification() {
        let notifier = DegradedNotifier::new(hybridcache_notifier::DegradedNotifierConfig::default());
        let handler = FallbackChainHandler::new(vec![memory_tier()]).with_notifier(notifier.clone());
        let _ = handler.get_with_fallback("missing", &FallbackOptions::default()).await;
        assert_eq!(notifier.len(), 0);
    }
}
