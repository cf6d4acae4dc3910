//! The durable local tier: a `sled` database surviving process restarts.

use crate::error::TierError;
use crate::glob::glob_match;
use crate::tier::Tier;
use crate::value::StoredEntry;
use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

const SCHEMA_VERSION: &str = "1";
const SCHEMA_KEY: &str = "__schema_version";

/// Tuning for a [`PersistentTier`].
#[derive(Debug, Clone)]
pub struct PersistentTierConfig {
    pub path: std::path::PathBuf,
    /// Total byte budget across every stored record. `0` means unbounded.
    pub max_bytes: u64,
    /// How long `open` retries against a lock held by another process
    /// before giving up.
    pub busy_timeout_ms: u64,
    /// Whether to flush aggressively (durable, more I/O) or let `sled`
    /// batch writes (faster, a narrower crash-loss window).
    pub wal: bool,
    /// How often the background vacuum sweep calls [`Tier::cleanup`]. `0`
    /// disables the background sweep.
    pub vacuum_interval_h: u64,
}

impl Default for PersistentTierConfig {
    fn default() -> Self {
        Self {
            path: std::path::PathBuf::from("hybridcache.db"),
            max_bytes: 0,
            busy_timeout_ms: 5000,
            wal: true,
            vacuum_interval_h: 24,
        }
    }
}

/// The `sled`-backed durable tier.
pub struct PersistentTier {
    db: sled::Db,
    max_bytes: u64,
    used_bytes: AtomicU64,
    disposed: AtomicBool,
}

impl PersistentTier {
    /// Opens (or creates) the database at `config.path`, rejecting a schema
    /// it doesn't recognize. Retries against a lock held by another process
    /// until `busy_timeout_ms` elapses.
    pub fn open(config: PersistentTierConfig) -> Result<Self, TierError> {
        let flush_every_ms = if config.wal { 200 } else { 2000 };
        let sled_config = sled::Config::new().path(&config.path).flush_every_ms(Some(flush_every_ms));
        let db = open_with_retry(&sled_config, &config)?;

        match db.get(SCHEMA_KEY).map_err(persistent_io_err)? {
            Some(version) if version.as_ref() == SCHEMA_VERSION.as_bytes() => {}
            Some(_) => {
                return Err(TierError::TransientIo {
                    tier: "persistent".to_string(),
                    message: "persisted schema version does not match; refusing to open".to_string(),
                });
            }
            None => {
                db.insert(SCHEMA_KEY, SCHEMA_VERSION.as_bytes()).map_err(persistent_io_err)?;
            }
        }

        let mut used_bytes: u64 = 0;
        for item in db.iter() {
            let (key_bytes, value_bytes) = item.map_err(persistent_io_err)?;
            if key_bytes.as_ref() == SCHEMA_KEY.as_bytes() {
                continue;
            }
            if let Ok(entry) = serde_json::from_slice::<StoredEntry>(&value_bytes) {
                used_bytes += entry.meta.size_bytes as u64;
            }
        }

        Ok(Self {
            db,
            max_bytes: config.max_bytes,
            used_bytes: AtomicU64::new(used_bytes),
            disposed: AtomicBool::new(false),
        })
    }

    /// Opens a temporary, test-only database.
    #[cfg(test)]
    pub fn open_temp(dir: &Path) -> Result<Self, TierError> {
        Self::open(PersistentTierConfig { path: dir.to_path_buf(), ..PersistentTierConfig::default() })
    }

    fn check_disposed(&self) -> Result<(), TierError> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(TierError::Disposed { tier: "persistent".to_string() });
        }
        Ok(())
    }

    fn read_entry(&self, key: &str) -> Result<Option<StoredEntry>, TierError> {
        let Some(bytes) = self.db.get(key).map_err(persistent_io_err)? else {
            return Ok(None);
        };
        let entry: StoredEntry = serde_json::from_slice(&bytes).map_err(|e| TierError::TransientIo {
            tier: "persistent".to_string(),
            message: format!("corrupt record for '{key}': {e}"),
        })?;

        if entry.meta.is_expired() {
            return Ok(None);
        }
        Ok(Some(entry))
    }

    fn read_entry_ignoring_ttl(&self, key: &str, max_age: std::time::Duration) -> Result<Option<StoredEntry>, TierError> {
        let Some(bytes) = self.db.get(key).map_err(persistent_io_err)? else {
            return Ok(None);
        };
        let entry: StoredEntry = serde_json::from_slice(&bytes).map_err(|e| TierError::TransientIo {
            tier: "persistent".to_string(),
            message: format!("corrupt record for '{key}': {e}"),
        })?;

        if entry.meta.age() > max_age {
            let _ = self.db.remove(key);
            return Ok(None);
        }
        Ok(Some(entry))
    }

    fn write_entry(&self, key: &str, entry: &StoredEntry) -> Result<(), TierError> {
        let new_size = entry.meta.size_bytes as u64;

        let old_size = match self.db.get(key).map_err(persistent_io_err)? {
            Some(bytes) => serde_json::from_slice::<StoredEntry>(&bytes).map(|e| e.meta.size_bytes as u64).unwrap_or(0),
            None => 0,
        };

        if self.max_bytes > 0 {
            let prospective = self.used_bytes.load(Ordering::Acquire).saturating_sub(old_size) + new_size;
            if prospective > self.max_bytes {
                return Err(TierError::CapacityExceeded { tier: "persistent".to_string(), size_bytes: entry.meta.size_bytes });
            }
        }

        let bytes = serde_json::to_vec(entry).map_err(|e| TierError::TransientIo {
            tier: "persistent".to_string(),
            message: format!("failed to serialize record for '{key}': {e}"),
        })?;
        self.db.insert(key, bytes).map_err(persistent_io_err)?;

        self.used_bytes.fetch_sub(old_size, Ordering::AcqRel);
        self.used_bytes.fetch_add(new_size, Ordering::AcqRel);
        Ok(())
    }

    fn forget_size(&self, key: &str) -> Result<(), TierError> {
        if let Some(bytes) = self.db.get(key).map_err(persistent_io_err)? {
            if let Ok(entry) = serde_json::from_slice::<StoredEntry>(&bytes) {
                self.used_bytes.fetch_sub(entry.meta.size_bytes as u64, Ordering::AcqRel);
            }
        }
        Ok(())
    }
}

fn persistent_io_err(e: sled::Error) -> TierError {
    TierError::TransientIo { tier: "persistent".to_string(), message: e.to_string() }
}

/// Retries `config.open()` against a lock held by another process until
/// `busy_timeout_ms` elapses, then surfaces the last error.
fn open_with_retry(config: &sled::Config, tier_config: &PersistentTierConfig) -> Result<sled::Db, TierError> {
    let deadline = Instant::now() + Duration::from_millis(tier_config.busy_timeout_ms);
    loop {
        match config.open() {
            Ok(db) => return Ok(db),
            Err(e) if Instant::now() < deadline => {
                std::thread::sleep(Duration::from_millis(50));
                let _ = e;
            }
            Err(e) => {
                return Err(TierError::TransientIo {
                    tier: "persistent".to_string(),
                    message: format!(
                        "failed to open sled db at {} after {}ms: {e}",
                        tier_config.path.display(),
                        tier_config.busy_timeout_ms
                    ),
                });
            }
        }
    }
}

#[async_trait]
impl Tier for PersistentTier {
    fn name(&self) -> &str {
        "persistent"
    }

    async fn get(&self, key: &str) -> Result<StoredEntry, TierError> {
        self.check_disposed()?;
        let mut entry = self.read_entry(key)?.ok_or(TierError::NotFound)?;
        entry.meta.record_access();
        self.write_entry(key, &entry)?;
        Ok(entry)
    }

    async fn get_stale(&self, key: &str, max_age: std::time::Duration) -> Result<StoredEntry, TierError> {
        self.check_disposed()?;
        self.read_entry_ignoring_ttl(key, max_age)?.ok_or(TierError::NotFound)
    }

    async fn set(&self, key: &str, entry: StoredEntry) -> Result<(), TierError> {
        self.check_disposed()?;
        self.write_entry(key, &entry)
    }

    async fn delete(&self, key: &str) -> Result<(), TierError> {
        self.check_disposed()?;
        self.forget_size(key)?;
        self.db.remove(key).map_err(persistent_io_err)?;
        Ok(())
    }

    async fn has(&self, key: &str) -> Result<bool, TierError> {
        self.check_disposed()?;
        Ok(self.read_entry(key)?.is_some())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, TierError> {
        self.check_disposed()?;
        let mut out = Vec::new();
        for item in self.db.iter() {
            let (key_bytes, _) = item.map_err(persistent_io_err)?;
            let key = String::from_utf8_lossy(&key_bytes).into_owned();
            if key == SCHEMA_KEY {
                continue;
            }
            if glob_match(pattern, &key) {
                out.push(key);
            }
        }
        Ok(out)
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<StoredEntry>>, TierError> {
        self.check_disposed()?;
        keys.iter().map(|k| self.read_entry(k)).collect()
    }

    async fn mset(&self, entries: Vec<(String, StoredEntry)>) -> Result<(), TierError> {
        self.check_disposed()?;
        let mut batch = sled::Batch::default();
        for (key, entry) in &entries {
            let bytes = serde_json::to_vec(entry).map_err(|e| TierError::TransientIo {
                tier: "persistent".to_string(),
                message: format!("failed to serialize record for '{key}': {e}"),
            })?;
            batch.insert(key.as_bytes(), bytes);
        }
        self.db.apply_batch(batch).map_err(persistent_io_err)
    }

    async fn metadata(&self, key: &str) -> Result<Option<StoredEntry>, TierError> {
        self.check_disposed()?;
        self.read_entry(key)
    }

    async fn size(&self) -> Result<usize, TierError> {
        self.check_disposed()?;
        Ok(self.db.len().saturating_sub(1))
    }

    /// Sweeps expired records. `sled` has no TTL support of its own, so this
    /// is the only thing that reclaims space from an entry whose `get` is
    /// never called again.
    async fn cleanup(&self) -> Result<(), TierError> {
        self.check_disposed()?;
        let mut expired = Vec::new();
        for item in self.db.iter() {
            let (key_bytes, value_bytes) = item.map_err(persistent_io_err)?;
            if key_bytes.as_ref() == SCHEMA_KEY.as_bytes() {
                continue;
            }
            if let Ok(entry) = serde_json::from_slice::<StoredEntry>(&value_bytes) {
                if entry.meta.is_expired() {
                    expired.push((key_bytes.to_vec(), entry.meta.size_bytes as u64));
                }
            }
        }
        for (key, size) in expired {
            self.db.remove(&key).map_err(persistent_io_err)?;
            self.used_bytes.fetch_sub(size, Ordering::AcqRel);
        }
        Ok(())
    }

    async fn dispose(&self) -> Result<(), TierError> {
        self.disposed.store(true, Ordering::Release);
        let _ = self.db.flush();
        Ok(())
    }
}
