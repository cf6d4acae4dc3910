//! The byte-capacity-bounded store backing [`crate::memory::MemoryTier`].
//!
//! Unlike the count-based stores in [`crate::eviction`], entries here carry
//! their own per-entry TTL via [`crate::value::EntryMeta`], and eviction is
//! driven by a byte budget rather than an entry count: after every insert,
//! entries are evicted (oldest-by-policy first) until `used_bytes` is back
//! under `capacity_bytes`.

use crate::eviction::{EvictionPolicy, EvictionStore, FifoStore, LfuStore, LruStore};
use crate::value::StoredEntry;

/// A key-addressed store with a byte budget, entry eviction, and per-entry
/// TTL expiry.
pub(crate) struct MemoryStore {
    store: Box<dyn EvictionStore<String, StoredEntry>>,
    capacity_bytes: usize,
    used_bytes: usize,
}

impl MemoryStore {
    /// `count_hint` bounds the underlying eviction store's entry count as a
    /// safety valve; `capacity_bytes` is the real budget this store
    /// enforces.
    pub(crate) fn new(policy: EvictionPolicy, capacity_bytes: usize, count_hint: usize) -> Self {
        let store: Box<dyn EvictionStore<String, StoredEntry>> = match policy {
            EvictionPolicy::Lru => Box::new(LruStore::new(count_hint)),
            EvictionPolicy::Lfu => Box::new(LfuStore::new(count_hint)),
            EvictionPolicy::Fifo => Box::new(FifoStore::new(count_hint)),
        };
        Self {
            store,
            capacity_bytes,
            used_bytes: 0,
        }
    }

    /// Returns the entry if present and not expired. An expired entry is
    /// left in place (not removed) so an emergency stale pass can still
    /// reach it via [`get_ignoring_ttl`](Self::get_ignoring_ttl); actual
    /// reclamation happens in `cleanup`.
    pub(crate) fn get(&mut self, key: &str) -> Option<StoredEntry> {
        let entry = self.store.get(&key.to_string())?.clone();
        if entry.meta.is_expired() {
            None
        } else {
            Some(entry)
        }
    }

    /// Inserts `entry`, evicting by policy until `used_bytes` fits within
    /// `capacity_bytes`. Returns the keys evicted as a result.
    pub(crate) fn insert(&mut self, key: String, entry: StoredEntry) -> Vec<String> {
        let new_size = entry.meta.size_bytes;

        if let Some((_, old)) = self.store.insert(key.clone(), entry) {
            self.used_bytes = self.used_bytes.saturating_sub(old.meta.size_bytes);
        }
        self.used_bytes += new_size;

        let mut evicted = Vec::new();
        while self.used_bytes > self.capacity_bytes {
            let Some(victim) = self.store.keys_snapshot().into_iter().find(|k| k != &key) else {
                break;
            };
            if let Some(removed) = self.store.remove(&victim) {
                self.used_bytes = self.used_bytes.saturating_sub(removed.meta.size_bytes);
                evicted.push(victim);
            } else {
                break;
            }
        }

        evicted
    }

    /// Returns the entry regardless of TTL, as long as its age is within
    /// `max_age`; entries older than `max_age` are removed and `None` is
    /// returned.
    pub(crate) fn get_ignoring_ttl(&mut self, key: &str, max_age: std::time::Duration) -> Option<StoredEntry> {
        let entry = self.store.get(&key.to_string())?.clone();
        if entry.meta.age() > max_age {
            self.remove(key);
            return None;
        }
        Some(entry)
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<StoredEntry> {
        let removed = self.store.remove(&key.to_string());
        if let Some(ref e) = removed {
            self.used_bytes = self.used_bytes.saturating_sub(e.meta.size_bytes);
        }
        removed
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        self.store.keys_snapshot()
    }

    pub(crate) fn len(&self) -> usize {
        self.store.len()
    }

    pub(crate) fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    pub(crate) fn clear(&mut self) {
        self.store.clear();
        self.used_bytes = 0;
    }
}
