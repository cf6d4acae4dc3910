//! The hot in-memory tier: byte-capacity-bounded, LRU by default, the first
//! tier every read and write touches.

use crate::error::TierError;
use crate::eviction::EvictionPolicy;
use crate::events::TierEvent;
use crate::store::MemoryStore;
use crate::tier::Tier;
use crate::value::StoredEntry;
use async_trait::async_trait;
use hybridcache_core::events::EventListeners;
use hybridcache_notifier::{DegradedNotifier, Notification, NotificationKind, Severity};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

const MAX_KEY_LEN: usize = 255;

/// Tuning for a [`MemoryTier`].
#[derive(Debug, Clone)]
pub struct MemoryTierConfig {
    pub capacity_bytes: usize,
    pub eviction_policy: EvictionPolicy,
    /// Upper bound on tracked entry count, independent of the byte budget.
    pub count_hint: usize,
}

impl Default for MemoryTierConfig {
    fn default() -> Self {
        Self {
            capacity_bytes: 64 * 1024 * 1024,
            eviction_policy: EvictionPolicy::Lru,
            count_hint: 10_000,
        }
    }
}

fn validate_key(key: &str) -> Result<(), TierError> {
    if key.is_empty() {
        return Err(TierError::MalformedKey { reason: "key is empty".to_string() });
    }
    if key.len() > MAX_KEY_LEN {
        return Err(TierError::MalformedKey {
            reason: format!("key exceeds {MAX_KEY_LEN} bytes ({} bytes)", key.len()),
        });
    }
    if key.chars().any(|c| c.is_control()) {
        return Err(TierError::MalformedKey { reason: "key contains a control character".to_string() });
    }
    Ok(())
}

use crate::glob::glob_match;

/// The in-process, byte-capacity-bounded hot tier.
pub struct MemoryTier {
    store: Mutex<MemoryStore>,
    capacity_bytes: usize,
    notifier: Option<DegradedNotifier>,
    event_listeners: EventListeners<TierEvent>,
    disposed: AtomicBool,
}

impl MemoryTier {
    pub fn new(config: MemoryTierConfig) -> Self {
        Self {
            store: Mutex::new(MemoryStore::new(config.eviction_policy, config.capacity_bytes, config.count_hint)),
            capacity_bytes: config.capacity_bytes,
            notifier: None,
            event_listeners: EventListeners::new(),
            disposed: AtomicBool::new(false),
        }
    }

    pub fn with_notifier(mut self, notifier: DegradedNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_event_listeners(mut self, listeners: EventListeners<TierEvent>) -> Self {
        self.event_listeners = listeners;
        self
    }

    fn check_disposed(&self) -> Result<(), TierError> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(TierError::Disposed { tier: self.name().to_string() });
        }
        Ok(())
    }

    fn notify_eviction(&self, key: &str) {
        if let Some(notifier) = &self.notifier {
            notifier.notify(
                Notification::new(NotificationKind::StorageFailure, self.name(), Severity::Info, "entry evicted under capacity pressure")
                    .with_key(key),
            );
        }
    }
}

#[async_trait]
impl Tier for MemoryTier {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<StoredEntry, TierError> {
        self.check_disposed()?;
        validate_key(key)?;

        let mut store = self.store.lock();
        match store.get(key) {
            Some(mut entry) => {
                entry.meta.record_access();
                store.insert(key.to_string(), entry.clone());
                self.event_listeners.emit(&TierEvent::Hit {
                    tier: self.name().to_string(),
                    timestamp: Instant::now(),
                    key: key.to_string(),
                });
                Ok(entry)
            }
            None => {
                self.event_listeners.emit(&TierEvent::Miss {
                    tier: self.name().to_string(),
                    timestamp: Instant::now(),
                    key: key.to_string(),
                });
                Err(TierError::NotFound)
            }
        }
    }

    async fn get_stale(&self, key: &str, max_age: std::time::Duration) -> Result<StoredEntry, TierError> {
        self.check_disposed()?;
        validate_key(key)?;
        self.store.lock().get_ignoring_ttl(key, max_age).ok_or(TierError::NotFound)
    }

    async fn set(&self, key: &str, entry: StoredEntry) -> Result<(), TierError> {
        self.check_disposed()?;
        validate_key(key)?;

        if entry.meta.size_bytes > self.capacity_bytes {
            return Err(TierError::CapacityExceeded {
                tier: self.name().to_string(),
                size_bytes: entry.meta.size_bytes,
            });
        }

        let mut store = self.store.lock();
        let evicted = store.insert(key.to_string(), entry);
        drop(store);

        for evicted_key in &evicted {
            self.event_listeners.emit(&TierEvent::Eviction {
                tier: self.name().to_string(),
                timestamp: Instant::now(),
                key: evicted_key.clone(),
            });
            self.notify_eviction(evicted_key);
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), TierError> {
        self.check_disposed()?;
        validate_key(key)?;
        self.store.lock().remove(key);
        Ok(())
    }

    async fn has(&self, key: &str) -> Result<bool, TierError> {
        self.check_disposed()?;
        validate_key(key)?;
        Ok(self.store.lock().get(key).is_some())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, TierError> {
        self.check_disposed()?;
        let store = self.store.lock();
        Ok(store.keys().into_iter().filter(|k| glob_match(pattern, k)).collect())
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<StoredEntry>>, TierError> {
        self.check_disposed()?;
        let mut store = self.store.lock();
        Ok(keys.iter().map(|k| store.get(k)).collect())
    }

    async fn mset(&self, entries: Vec<(String, StoredEntry)>) -> Result<(), TierError> {
        self.check_disposed()?;
        let mut store = self.store.lock();
        for (key, entry) in entries {
            validate_key(&key)?;
            store.insert(key, entry);
        }
        Ok(())
    }

    async fn metadata(&self, key: &str) -> Result<Option<StoredEntry>, TierError> {
        self.check_disposed()?;
        validate_key(key)?;
        Ok(self.store.lock().get(key))
    }

    async fn size(&self) -> Result<usize, TierError> {
        self.check_disposed()?;
        Ok(self.store.lock().len())
    }

    async fn cleanup(&self) -> Result<(), TierError> {
        self.check_disposed()?;
        let mut store = self.store.lock();
        let expired: Vec<String> = store
            .keys()
            .into_iter()
            .filter(|k| store.get(k).is_none())
            .collect();
        for key in expired {
            store.remove(&key);
        }
        Ok(())
    }

    async fn dispose(&self) -> Result<(), TierError> {
        self.disposed.store(true, Ordering::Release);
        self.store.lock().clear();
        Ok(())
    }
}
