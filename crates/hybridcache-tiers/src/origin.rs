//! The remote, read-only tier: wraps whatever fetches data from the
//! upstream source, with an optional short-TTL in-memory buffer to absorb
//! request bursts against a rate-limited API.
//!
//! The circuit breaker and retry/backoff around origin calls live one layer
//! up, in the fallback chain — this tier is deliberately unaware of either,
//! so it stays testable with a fake [`OriginFetcher`] and has no dependency
//! on `hybridcache-circuitbreaker` or `hybridcache-recovery`.

use crate::error::TierError;
use crate::glob::glob_match;
use crate::store::MemoryStore;
use crate::tier::Tier;
use crate::value::StoredEntry;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// A narrow fetch capability the engine's richer upstream adapter
/// implements; kept local to this crate to avoid a dependency cycle with
/// the facade crate.
#[async_trait]
pub trait OriginFetcher: Send + Sync {
    async fn fetch(&self, key: &str) -> Result<StoredEntry, TierError>;

    /// Lists keys known upstream matching `pattern`; used by `Tier::keys`.
    /// Adapters without a listing capability can return an empty vec.
    async fn fetch_keys(&self, pattern: &str) -> Result<Vec<String>, TierError>;
}

/// Tuning for an [`OriginTier`].
#[derive(Debug, Clone, Copy)]
pub struct OriginTierConfig {
    /// Seconds a fetched record is buffered before the next `get` re-fetches
    /// it. `0` disables the buffer entirely.
    pub buffer_ttl_seconds: u64,
    pub buffer_capacity_bytes: usize,
}

impl Default for OriginTierConfig {
    fn default() -> Self {
        Self { buffer_ttl_seconds: 30, buffer_capacity_bytes: 16 * 1024 * 1024 }
    }
}

/// Wraps an [`OriginFetcher`] as a [`Tier`]. `set`/`delete`/`mset` are
/// no-ops: the origin is authoritative and not writable from here.
pub struct OriginTier {
    fetcher: Box<dyn OriginFetcher>,
    buffer: Option<Mutex<MemoryStore>>,
    buffer_ttl_seconds: u64,
    disposed: AtomicBool,
}

impl OriginTier {
    pub fn new(fetcher: Box<dyn OriginFetcher>, config: OriginTierConfig) -> Self {
        let buffer = (config.buffer_ttl_seconds > 0).then(|| {
            Mutex::new(MemoryStore::new(crate::eviction::EvictionPolicy::Lru, config.buffer_capacity_bytes, 1000))
        });
        Self {
            fetcher,
            buffer,
            buffer_ttl_seconds: config.buffer_ttl_seconds,
            disposed: AtomicBool::new(false),
        }
    }

    fn check_disposed(&self) -> Result<(), TierError> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(TierError::Disposed { tier: "origin".to_string() });
        }
        Ok(())
    }
}

#[async_trait]
impl Tier for OriginTier {
    fn name(&self) -> &str {
        "origin"
    }

    async fn get(&self, key: &str) -> Result<StoredEntry, TierError> {
        self.check_disposed()?;

        if let Some(buffer) = &self.buffer {
            if let Some(entry) = buffer.lock().get(key) {
                return Ok(entry);
            }
        }

        let entry = self.fetcher.fetch(key).await?;

        if let Some(buffer) = &self.buffer {
            let mut buffered = entry.clone();
            buffered.meta.ttl_seconds = self.buffer_ttl_seconds;
            buffer.lock().insert(key.to_string(), buffered);
        }

        Ok(entry)
    }

    async fn set(&self, _key: &str, _entry: StoredEntry) -> Result<(), TierError> {
        self.check_disposed()?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), TierError> {
        self.check_disposed()?;
        if let Some(buffer) = &self.buffer {
            buffer.lock().remove(key);
        }
        Ok(())
    }

    async fn has(&self, key: &str) -> Result<bool, TierError> {
        self.check_disposed()?;
        Ok(self.get(key).await.is_ok())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, TierError> {
        self.check_disposed()?;
        let upstream = self.fetcher.fetch_keys(pattern).await?;
        Ok(upstream.into_iter().filter(|k| glob_match(pattern, k)).collect())
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<StoredEntry>>, TierError> {
        self.check_disposed()?;
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            out.push(self.get(key).await.ok());
        }
        Ok(out)
    }

    async fn mset(&self, _entries: Vec<(String, StoredEntry)>) -> Result<(), TierError> {
        self.check_disposed()?;
        Ok(())
    }

    async fn metadata(&self, key: &str) -> Result<Option<StoredEntry>, TierError> {
        self.check_disposed()?;
        Ok(self.get(key).await.ok())
    }

    async fn size(&self) -> Result<usize, TierError> {
        self.check_disposed()?;
        Ok(self.buffer.as_ref().map(|b| b.lock().len()).unwrap_or(0))
    }

    async fn cleanup(&self) -> Result<(), TierError> {
        self.check_disposed()?;
        if let Some(buffer) = &self.buffer {
            let mut buffer = buffer.lock();
            let expired: Vec<String> = buffer.keys().into_iter().filter(|k| buffer.get(k).is_none()).collect();
            for key in expired {
                buffer.remove(&key);
            }
        }
        Ok(())
    }

    async fn dispose(&self) -> Result<(), TierError> {
        self.disposed.store(true, Ordering::Release);
        if let Some(buffer) = &self.buffer {
            buffer.lock().clear();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{CacheValue, EntryMeta};
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::sync::Arc;

    struct CountingFetcher {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl OriginFetcher for CountingFetcher {
        async fn fetch(&self, key: &str) -> Result<StoredEntry, TierError> {
            self.calls.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(StoredEntry {
                value: CacheValue::Opaque(key.as_bytes().to_vec()),
                meta: EntryMeta::new(key.len(), 0, "origin"),
            })
        }

        async fn fetch_keys(&self, _pattern: &str) -> Result<Vec<String>, TierError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn get_fetches_from_origin_on_first_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let tier = OriginTier::new(Box::new(CountingFetcher { calls: Arc::clone(&calls) }), OriginTierConfig::default());

        let entry = tier.get("component:react:button").await.unwrap();
        assert_eq!(entry.value, CacheValue::Opaque(b"component:react:button".to_vec()));
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);
    }

    #[tokio::test]
    async fn buffered_result_absorbs_a_second_call_within_ttl() {
        let calls = Arc::new(AtomicUsize::new(0));
        let tier = OriginTier::new(Box::new(CountingFetcher { calls: Arc::clone(&calls) }), OriginTierConfig::default());

        tier.get("k").await.unwrap();
        tier.get("k").await.unwrap();
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);
    }

    #[tokio::test]
    async fn writes_are_no_ops() {
        let calls = Arc::new(AtomicUsize::new(0));
        let tier = OriginTier::new(Box::new(CountingFetcher { calls: Arc::clone(&calls) }), OriginTierConfig::default());
        tier.set("k", StoredEntry { value: CacheValue::Opaque(vec![]), meta: EntryMeta::new(0, 0, "origin") }).await.unwrap();
        assert_eq!(tier.size().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn disposed_tier_rejects_get() {
        let calls = Arc::new(AtomicUsize::new(0));
        let tier = OriginTier::new(Box::new(CountingFetcher { calls }), OriginTierConfig::default());
        tier.dispose().await.unwrap();
        assert!(matches!(tier.get("k").await, Err(TierError::Disposed { .. })));
    }
}
