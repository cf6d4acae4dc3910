//! The capability surface every storage tier implements.

use crate::error::TierError;
use crate::value::StoredEntry;
use async_trait::async_trait;
use std::time::Duration;

/// A single storage tier: memory, persistent, or origin.
///
/// All three implementations (`MemoryTier`, `PersistentTier`, `OriginTier`)
/// expose this same contract so the fallback chain can treat them
/// uniformly. `set`/`delete`/`mset` are no-ops returning `Ok(())` on a
/// read-only tier (origin).
#[async_trait]
pub trait Tier: Send + Sync {
    /// Stable identifier used in logs, notifications, and error messages
    /// (`"memory"`, `"persistent"`, `"origin"`).
    fn name(&self) -> &str;

    async fn get(&self, key: &str) -> Result<StoredEntry, TierError>;

    /// Returns `key` even if its TTL has lapsed, as long as it's no older
    /// than `max_age` — the emergency stale pass' last resort once every
    /// tier has failed or expired its fresh copy. The default forwards to
    /// [`get`](Self::get), which is the right behavior for a tier (like
    /// origin) with no notion of serving something past its freshness
    /// window.
    async fn get_stale(&self, key: &str, max_age: Duration) -> Result<StoredEntry, TierError> {
        let _ = max_age;
        self.get(key).await
    }

    /// `ttl_seconds = 0` means no expiry.
    async fn set(&self, key: &str, entry: StoredEntry) -> Result<(), TierError>;

    async fn delete(&self, key: &str) -> Result<(), TierError>;

    async fn has(&self, key: &str) -> Result<bool, TierError>;

    /// Keys matching a glob pattern (`*` and `?` wildcards).
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, TierError>;

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<StoredEntry>>, TierError>;

    async fn mset(&self, entries: Vec<(String, StoredEntry)>) -> Result<(), TierError>;

    async fn metadata(&self, key: &str) -> Result<Option<StoredEntry>, TierError>;

    /// Current number of entries held by this tier.
    async fn size(&self) -> Result<usize, TierError>;

    /// Evicts expired entries and reclaims space; a no-op for tiers without
    /// background maintenance.
    async fn cleanup(&self) -> Result<(), TierError>;

    /// Releases resources (file handles, background tasks). After this
    /// call every other method returns [`TierError::Disposed`].
    async fn dispose(&self) -> Result<(), TierError>;
}
