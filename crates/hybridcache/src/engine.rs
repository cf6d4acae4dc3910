//! [`HybridEngine`]: wires memory, persistent, and origin tiers behind one
//! deduplicated, circuit-guarded, fallback-aware facade.

use crate::adapter::{AdapterOriginFetcher, UpstreamAdapter};
use crate::config::{CacheStrategy, EngineConfig, EvictionKind};
use crate::error::{ConfigError, EngineError};
use crate::stats::{StatsRegistry, StatsSnapshot};
use hybridcache_circuitbreaker::{CircuitBreaker, CircuitBreakerConfig, CircuitMetrics};
use hybridcache_dedup::{DedupConfig, RequestDeduplicator};
use hybridcache_fallback::{FallbackChainHandler, FallbackOptions, FallbackTier};
use hybridcache_notifier::{ActiveIssue, DegradedNotifier, DegradedNotifierConfig, Notification, NotificationKind, Severity};
use hybridcache_tiers::{
    CacheValue, EntryMeta, EvictionPolicy, KeyCodec, MemoryTier, MemoryTierConfig, OriginTier, OriginTierConfig, PersistentTier,
    PersistentTierConfig, ResourceKind, StoredEntry, Tier,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn eviction_policy(kind: EvictionKind) -> EvictionPolicy {
    match kind {
        EvictionKind::Lru => EvictionPolicy::Lru,
        EvictionKind::Lfu => EvictionPolicy::Lfu,
        EvictionKind::Fifo => EvictionPolicy::Fifo,
    }
}

/// One queued write-behind job: a set the memory tier already accepted,
/// waiting to land on the persistent tier.
struct WriteBehindJob {
    key: String,
    entry: StoredEntry,
}

/// Builds a [`HybridEngine`] from an [`EngineConfig`] and (if the origin
/// tier is enabled) an [`UpstreamAdapter`].
pub struct HybridEngineBuilder {
    config: EngineConfig,
    adapter: Option<Arc<dyn UpstreamAdapter>>,
}

impl HybridEngineBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self { config, adapter: None }
    }

    pub fn adapter(mut self, adapter: Arc<dyn UpstreamAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    /// Validates the configuration and constructs every enabled tier,
    /// degrading gracefully (disabling the tier, raising a critical
    /// notification) rather than failing outright if persistent storage
    /// can't open or the origin tier has no adapter to drive it.
    ///
    /// Must be called from inside a Tokio runtime: the write-behind worker
    /// is spawned as part of construction.
    pub fn build(self) -> Result<HybridEngine, ConfigError> {
        self.config.validate()?;

        let notifier = DegradedNotifier::new(DegradedNotifierConfig::default());
        let stats = Arc::new(StatsRegistry::new());

        let memory: Option<Arc<MemoryTier>> = self.config.storage.memory.enabled.then(|| {
            Arc::new(
                MemoryTier::new(MemoryTierConfig {
                    capacity_bytes: self.config.storage.memory.max_bytes as usize,
                    eviction_policy: eviction_policy(self.config.storage.memory.eviction),
                    count_hint: 10_000,
                })
                .with_notifier(notifier.clone()),
            )
        });

        let persistent: Option<Arc<PersistentTier>> = if self.config.storage.persistent.enabled {
            match PersistentTier::open(PersistentTierConfig {
                path: self.config.storage.persistent.path.clone(),
                max_bytes: self.config.storage.persistent.max_bytes,
                busy_timeout_ms: self.config.storage.persistent.busy_timeout_ms,
                wal: self.config.storage.persistent.wal,
                vacuum_interval_h: self.config.storage.persistent.vacuum_interval_h,
            }) {
                Ok(tier) => Some(Arc::new(tier)),
                Err(err) => {
                    notifier.notify(Notification::new(
                        NotificationKind::StorageFailure,
                        "persistent",
                        Severity::Critical,
                        format!("persistent tier failed to open, continuing without it: {err}"),
                    ));
                    None
                }
            }
        } else {
            None
        };

        let origin: Option<Arc<OriginTier>> = if self.config.storage.origin.enabled && !self.config.features.offline_mode {
            match &self.adapter {
                Some(adapter) => {
                    let fetcher = Box::new(AdapterOriginFetcher::new(Arc::clone(adapter)));
                    Some(Arc::new(OriginTier::new(fetcher, OriginTierConfig::default())))
                }
                None => {
                    notifier.notify(Notification::new(
                        NotificationKind::StorageFailure,
                        "origin",
                        Severity::Critical,
                        "origin tier enabled but no upstream adapter was supplied, continuing without it",
                    ));
                    None
                }
            }
        } else {
            None
        };

        let mut fallback_tiers = Vec::new();
        if let Some(tier) = &memory {
            fallback_tiers.push(FallbackTier::new(Arc::clone(tier) as Arc<dyn Tier>, CircuitBreaker::new(CircuitBreakerConfig::memory_defaults())));
        }
        if let Some(tier) = &persistent {
            fallback_tiers
                .push(FallbackTier::new(Arc::clone(tier) as Arc<dyn Tier>, CircuitBreaker::new(CircuitBreakerConfig::persistent_defaults())));
        }
        if let Some(tier) = &origin {
            fallback_tiers.push(FallbackTier::new(Arc::clone(tier) as Arc<dyn Tier>, CircuitBreaker::new(CircuitBreakerConfig::origin_defaults())));
        }

        let fallback = Arc::new(FallbackChainHandler::new(fallback_tiers).with_notifier(notifier.clone()));
        let dedup = Arc::new(RequestDeduplicator::new(DedupConfig::new("hybridcache")));

        let write_behind_tx = if matches!(self.config.cache.strategy, CacheStrategy::WriteBehind) && persistent.is_some() {
            Some(spawn_write_behind_worker(
                Arc::clone(persistent.as_ref().unwrap()),
                notifier.clone(),
                self.config.performance.queue_size,
            ))
        } else {
            None
        };

        if let Some(tier) = &persistent {
            let interval_h = self.config.storage.persistent.vacuum_interval_h;
            if interval_h > 0 {
                spawn_vacuum_worker(Arc::clone(tier), notifier.clone(), Duration::from_secs(interval_h * 3600));
            }
        }

        Ok(HybridEngine {
            config: self.config,
            memory,
            persistent,
            origin,
            fallback,
            dedup,
            notifier,
            stats,
            write_behind_tx,
            disposed: AtomicBool::new(false),
        })
    }
}

fn spawn_write_behind_worker(
    persistent: Arc<PersistentTier>,
    notifier: DegradedNotifier,
    queue_size: usize,
) -> tokio::sync::mpsc::Sender<WriteBehindJob> {
    let (tx, mut rx) = tokio::sync::mpsc::channel::<WriteBehindJob>(queue_size.max(1));
    tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            if let Err(err) = persistent.set(&job.key, job.entry).await {
                notifier.notify(Notification::new(
                    NotificationKind::StorageFailure,
                    "persistent",
                    Severity::Warning,
                    format!("write-behind flush for '{}' failed: {err}", job.key),
                ));
            }
        }
    });
    tx
}

/// Periodically sweeps expired records off the persistent tier so entries
/// whose `get` is never called again still get reclaimed.
fn spawn_vacuum_worker(persistent: Arc<PersistentTier>, notifier: DegradedNotifier, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(err) = persistent.cleanup().await {
                notifier.notify(Notification::new(
                    NotificationKind::StorageFailure,
                    "persistent",
                    Severity::Warning,
                    format!("vacuum sweep failed: {err}"),
                ));
            }
        }
    });
}

/// The resilient multi-tier engine: memory, persistent, and origin behind
/// deduplication, per-tier circuit breakers, and a fallback chain.
pub struct HybridEngine {
    config: EngineConfig,
    memory: Option<Arc<MemoryTier>>,
    persistent: Option<Arc<PersistentTier>>,
    origin: Option<Arc<OriginTier>>,
    fallback: Arc<FallbackChainHandler>,
    dedup: Arc<RequestDeduplicator<String, CacheValue, EngineError>>,
    notifier: DegradedNotifier,
    stats: Arc<StatsRegistry>,
    write_behind_tx: Option<tokio::sync::mpsc::Sender<WriteBehindJob>>,
    disposed: AtomicBool,
}

impl HybridEngine {
    pub fn builder(config: EngineConfig) -> HybridEngineBuilder {
        HybridEngineBuilder::new(config)
    }

    fn check_disposed(&self) -> Result<(), EngineError> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(EngineError::Disposed);
        }
        Ok(())
    }

    /// Resolves `key` by walking the fallback chain, coalescing concurrent
    /// lookups for the same key onto a single attempt.
    pub async fn get(&self, key: &str) -> Result<CacheValue, EngineError> {
        self.check_disposed()?;
        let parsed = KeyCodec::parse(key)?;

        let fallback = Arc::clone(&self.fallback);
        let key_owned = key.to_string();
        let options = FallbackOptions::default();

        let started = Instant::now();
        let result = self
            .dedup
            .dedupe(key_owned.clone(), move || async move { fallback.get_with_fallback(&key_owned, &options).await })
            .await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(value) => {
                self.stats.record_hit("engine", elapsed_ms);
                if !matches!(self.config.cache.strategy, CacheStrategy::CacheAside) && !value.is_partial() {
                    self.promote_to_memory(key, parsed.kind, value.clone()).await;
                }
            }
            Err(_) => self.stats.record_miss("engine", elapsed_ms),
        }
        result
    }

    /// Best-effort write-back of a value a lower tier served, so the next
    /// lookup for the same key is a hot-tier hit. Failure is logged as a
    /// warning rather than surfaced, since the caller already has their
    /// answer.
    async fn promote_to_memory(&self, key: &str, kind: ResourceKind, value: CacheValue) {
        let Some(memory) = &self.memory else { return };
        let ttl = self.ttl_for(kind);
        let size = value.size_bytes();
        if let Err(err) = memory.set(key, StoredEntry { value, meta: EntryMeta::new(size, ttl, "memory") }).await {
            self.notifier.notify(Notification::new(
                NotificationKind::StorageFailure,
                "memory",
                Severity::Warning,
                format!("write-back promotion for '{key}' failed: {err}"),
            ));
        }
    }

    fn ttl_for(&self, kind: ResourceKind) -> u64 {
        match kind {
            ResourceKind::ComponentMetadata => self.config.cache.ttl.metadata,
            ResourceKind::Block => self.config.cache.ttl.blocks,
            _ => self.config.cache.ttl.components,
        }
    }

    /// Resolves every key independently; lookups for distinct keys proceed
    /// concurrently and still dedupe against any other in-flight `get` for
    /// the same key.
    pub async fn get_many(&self, keys: &[String]) -> HashMap<String, Result<CacheValue, EngineError>> {
        let results = futures::future::join_all(keys.iter().map(|k| async move { (k.clone(), self.get(k).await) })).await;
        results.into_iter().collect()
    }

    /// Writes `value` under `key` according to the configured
    /// [`CacheStrategy`]:
    /// - `WriteThrough`/`ReadThrough` write memory and persistent
    ///   synchronously before returning.
    /// - `WriteBehind` writes memory synchronously and queues the
    ///   persistent write; a full queue drops the job with a critical
    ///   notification rather than blocking the caller.
    /// - `CacheAside` doesn't write the cache at all — it invalidates `key`
    ///   so the next `get` repopulates from origin.
    pub async fn set(&self, key: &str, value: CacheValue, ttl_seconds: Option<u64>) -> Result<(), EngineError> {
        self.check_disposed()?;
        let parsed = KeyCodec::parse(key)?;

        if matches!(self.config.cache.strategy, CacheStrategy::CacheAside) {
            return self.invalidate(key).await;
        }

        let ttl = ttl_seconds.unwrap_or_else(|| self.ttl_for(parsed.kind));
        let size = value.size_bytes();

        if let Some(memory) = &self.memory {
            memory.set(key, StoredEntry { value: value.clone(), meta: EntryMeta::new(size, ttl, "memory") }).await?;
        }

        match (&self.config.cache.strategy, &self.persistent) {
            (CacheStrategy::WriteBehind, Some(_)) => {
                let entry = StoredEntry { value, meta: EntryMeta::new(size, ttl, "persistent") };
                if let Some(tx) = &self.write_behind_tx {
                    if tx.try_send(WriteBehindJob { key: key.to_string(), entry }).is_err() {
                        self.notifier.notify(Notification::new(
                            NotificationKind::StorageFailure,
                            "persistent",
                            Severity::Critical,
                            format!("write-behind queue full, dropping write for '{key}'"),
                        ));
                    }
                }
            }
            (_, Some(persistent)) => {
                persistent.set(key, StoredEntry { value, meta: EntryMeta::new(size, ttl, "persistent") }).await?;
            }
            (_, None) => {}
        }

        Ok(())
    }

    /// Deletes `key_or_glob` from memory and persistent (origin is
    /// read-only and never targeted). A pattern containing `*` or `?` is
    /// expanded against each writable tier's own key listing first.
    pub async fn invalidate(&self, key_or_glob: &str) -> Result<(), EngineError> {
        self.check_disposed()?;
        let is_pattern = key_or_glob.contains('*') || key_or_glob.contains('?');

        for tier in [self.memory.as_ref().map(|t| t.clone() as Arc<dyn Tier>), self.persistent.as_ref().map(|t| t.clone() as Arc<dyn Tier>)]
            .into_iter()
            .flatten()
        {
            if is_pattern {
                let keys = tier.keys(key_or_glob).await?;
                for key in keys {
                    tier.delete(&key).await?;
                }
            } else {
                tier.delete(key_or_glob).await?;
            }
        }
        Ok(())
    }

    /// A consistent snapshot of per-tier hit/miss/latency counters plus the
    /// deduplicator's own counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(Some(self.dedup.stats()))
    }

    /// A snapshot of each tier's circuit breaker, keyed by tier name.
    pub fn circuit_status(&self) -> HashMap<String, CircuitMetrics> {
        self.fallback.circuit_status()
    }

    /// Active degraded-state issues within the last `window_min` minutes.
    pub fn notifications(&self, window_min: u64) -> Vec<ActiveIssue> {
        self.notifier.active_issues(window_min)
    }

    /// True if any active issue in the window is `error` or `critical`.
    pub fn is_degraded(&self, window_min: u64) -> bool {
        self.notifier.is_degraded(window_min)
    }

    /// Disposes every tier in reverse construction order, after flushing
    /// the write-behind queue (if any) for up to `grace`. Anything left
    /// queued past `grace` is dropped with a critical notification.
    pub async fn dispose(&self, grace: Duration) -> Result<(), EngineError> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        if let Some(tx) = &self.write_behind_tx {
            let deadline = tokio::time::Instant::now() + grace;
            while !tx.is_closed() && tx.capacity() < tx.max_capacity() {
                if tokio::time::Instant::now() >= deadline {
                    self.notifier.notify(Notification::new(
                        NotificationKind::StorageFailure,
                        "persistent",
                        Severity::Critical,
                        "write-behind queue not drained before dispose grace period elapsed",
                    ));
                    break;
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        }

        if let Some(origin) = &self.origin {
            origin.dispose().await?;
        }
        if let Some(persistent) = &self.persistent {
            persistent.dispose().await?;
        }
        if let Some(memory) = &self.memory {
            memory.dispose().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::AdapterError;
    use async_trait::async_trait;
    use serde_json::json;

    struct FakeAdapter;

    #[async_trait]
    impl UpstreamAdapter for FakeAdapter {
        async fn get_component_source(&self, name: &str) -> Result<serde_json::Value, AdapterError> {
            Ok(json!({
                "name": name,
                "code": "export default function() {}",
                "demo": "<Button />",
                "metadata": {"category": "actions"},
                "dependencies": [],
            }))
        }
        async fn get_component_demo(&self, _name: &str) -> Result<serde_json::Value, AdapterError> {
            Err(AdapterError::NotFound)
        }
        async fn get_component_metadata(&self, _name: &str) -> Result<serde_json::Value, AdapterError> {
            Err(AdapterError::NotFound)
        }
        async fn get_block(&self, name: &str, _include_components: bool) -> Result<serde_json::Value, AdapterError> {
            Ok(json!({"name": name, "code": "..."}))
        }
        async fn build_directory_tree(&self, owner: &str, repo: &str, path: &str, branch: &str) -> Result<serde_json::Value, AdapterError> {
            Ok(json!({"owner": owner, "repo": repo, "path": path, "branch": branch}))
        }
        async fn list_components(&self) -> Result<Vec<String>, AdapterError> {
            Ok(vec!["button".to_string()])
        }
    }

    fn memory_only_config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.storage.persistent.enabled = false;
        config.storage.origin.enabled = false;
        config.storage.r#type = crate::config::StorageType::MemoryOnly;
        config
    }

    #[tokio::test]
    async fn get_falls_through_to_origin_and_returns_complete_component() {
        let mut config = EngineConfig::default();
        config.storage.persistent.enabled = false;

        let engine = HybridEngine::builder(config).adapter(Arc::new(FakeAdapter)).build().unwrap();
        let value = engine.get("component:react:button").await.unwrap();
        assert!(!value.is_partial());
    }

    fn complete_button() -> CacheValue {
        CacheValue::Component {
            name: Some("button".to_string()),
            code: Some("...".to_string()),
            demo: Some("...".to_string()),
            metadata: Some(json!({})),
            dependencies: Some(Vec::new()),
            partial: false,
            missing_fields: Vec::new(),
        }
    }

    #[tokio::test]
    async fn set_then_get_serves_from_memory_without_touching_origin() {
        let engine = HybridEngine::builder(memory_only_config()).build().unwrap();
        engine.set("component:react:button", complete_button(), None).await.unwrap();

        let value = engine.get("component:react:button").await.unwrap();
        assert!(!value.is_partial());
    }

    #[tokio::test]
    async fn invalidate_removes_the_entry_from_memory() {
        let engine = HybridEngine::builder(memory_only_config()).build().unwrap();
        engine.set("component:react:button", complete_button(), None).await.unwrap();
        engine.invalidate("component:react:button").await.unwrap();

        assert!(matches!(engine.get("component:react:button").await, Err(EngineError::AllTiersFailed { .. })));
    }

    #[tokio::test]
    async fn concurrent_gets_for_the_same_miss_collapse_into_one_origin_call() {
        let mut config = EngineConfig::default();
        config.storage.persistent.enabled = false;

        let engine = Arc::new(HybridEngine::builder(config).adapter(Arc::new(FakeAdapter)).build().unwrap());
        let mut handles = Vec::new();
        for _ in 0..20 {
            let engine = Arc::clone(&engine);
            handles.push(tokio::spawn(async move { engine.get("component:react:button").await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert!(engine.stats().dedup.unwrap().total_requests >= 20);
    }

    #[tokio::test]
    async fn cache_aside_strategy_invalidates_instead_of_writing() {
        let mut config = memory_only_config();
        config.cache.strategy = CacheStrategy::CacheAside;
        let engine = HybridEngine::builder(config).build().unwrap();

        engine.set("component:react:button", complete_button(), None).await.unwrap();
        assert!(matches!(engine.get("component:react:button").await, Err(EngineError::AllTiersFailed { .. })));
    }

    #[tokio::test]
    async fn malformed_key_is_rejected_before_touching_any_tier() {
        let engine = HybridEngine::builder(memory_only_config()).build().unwrap();
        assert!(matches!(engine.get("not-a-real-kind:react:button").await, Err(EngineError::MalformedKey { .. })));
    }

    #[tokio::test]
    async fn dispose_then_operate_returns_disposed() {
        let engine = HybridEngine::builder(memory_only_config()).build().unwrap();
        engine.dispose(Duration::from_millis(50)).await.unwrap();
        assert!(matches!(engine.get("component:react:button").await, Err(EngineError::Disposed)));
    }

    #[tokio::test]
    async fn circuit_status_reports_every_constructed_tier() {
        let mut config = EngineConfig::default();
        config.storage.persistent.enabled = false;

        let engine = HybridEngine::builder(config).adapter(Arc::new(FakeAdapter)).build().unwrap();
        let status = engine.circuit_status();
        assert!(status.contains_key("memory"));
        assert!(status.contains_key("origin"));
    }
}
