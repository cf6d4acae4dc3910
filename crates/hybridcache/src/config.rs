//! The nested configuration the engine validates at startup and consumes to
//! build its tiers and write strategy. The shape mirrors the recognized
//! option surface: `storage.*`, `cache.*`, `performance.*`,
//! `circuit_breaker.*`, `monitoring.*`, `features.*`. Loading this from a
//! file or environment is an external concern; this crate only validates
//! and consumes the resulting value.

use crate::error::ConfigError;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub storage: StorageConfig,
    pub cache: CacheConfig,
    pub performance: PerformanceConfig,
    pub circuit_breaker: CircuitBreakerSettings,
    pub monitoring: MonitoringConfig,
    pub features: FeatureFlags,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            cache: CacheConfig::default(),
            performance: PerformanceConfig::default(),
            circuit_breaker: CircuitBreakerSettings::default(),
            monitoring: MonitoringConfig::default(),
            features: FeatureFlags::default(),
        }
    }
}

impl EngineConfig {
    /// Business-rule validation enforced at startup, independent of what a
    /// config loader already validated against the schema.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.storage.memory.enabled && !self.storage.persistent.enabled && !self.storage.origin.enabled {
            return Err(ConfigError::NoStorageEnabled);
        }

        if self.storage.memory.enabled && self.storage.persistent.enabled && self.storage.memory.max_bytes >= self.storage.persistent.max_bytes {
            return Err(ConfigError::MemoryNotSmallerThanPersistent {
                memory_bytes: self.storage.memory.max_bytes,
                persistent_bytes: self.storage.persistent.max_bytes,
            });
        }

        if self.cache.ttl.metadata > self.cache.ttl.components || self.cache.ttl.metadata > self.cache.ttl.blocks {
            return Err(ConfigError::MetadataTtlTooLong {
                metadata_s: self.cache.ttl.metadata,
                components_s: self.cache.ttl.components,
                blocks_s: self.cache.ttl.blocks,
            });
        }

        if self.cache.compression.enabled && !(1..=9).contains(&self.cache.compression.level) {
            return Err(ConfigError::InvalidCompressionLevel(self.cache.compression.level));
        }

        if self.circuit_breaker.enabled && self.circuit_breaker.reset_timeout_ms < self.circuit_breaker.timeout_ms {
            return Err(ConfigError::ResetTimeoutTooShort {
                timeout_ms: self.circuit_breaker.timeout_ms,
                reset_timeout_ms: self.circuit_breaker.reset_timeout_ms,
            });
        }

        match self.storage.r#type {
            StorageType::MemoryOnly if !self.storage.memory.enabled => {
                return Err(ConfigError::MemoryOnlyRequiresMemory);
            }
            StorageType::PersistentOnly if !self.storage.persistent.enabled => {
                return Err(ConfigError::PersistentOnlyRequiresPersistent);
            }
            _ => {}
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageType {
    Hybrid,
    MemoryOnly,
    PersistentOnly,
}

impl Default for StorageType {
    fn default() -> Self {
        StorageType::Hybrid
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub r#type: StorageType,
    pub memory: MemoryConfig,
    pub persistent: PersistentConfig,
    pub origin: OriginConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            r#type: StorageType::default(),
            memory: MemoryConfig::default(),
            persistent: PersistentConfig::default(),
            origin: OriginConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvictionKind {
    Lru,
    Lfu,
    Fifo,
}

impl Default for EvictionKind {
    fn default() -> Self {
        EvictionKind::Lru
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub enabled: bool,
    pub max_bytes: u64,
    pub ttl_s: u64,
    pub eviction: EvictionKind,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self { enabled: true, max_bytes: 50 * 1024 * 1024, ttl_s: 3600, eviction: EvictionKind::Lru }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PersistentConfig {
    pub enabled: bool,
    pub path: PathBuf,
    pub max_bytes: u64,
    pub busy_timeout_ms: u64,
    pub vacuum_interval_h: u64,
    pub wal: bool,
}

impl Default for PersistentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from("hybridcache.db"),
            max_bytes: 200 * 1024 * 1024,
            busy_timeout_ms: 5000,
            vacuum_interval_h: 24,
            wal: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OriginConfig {
    pub enabled: bool,
    pub base_url: Option<String>,
    pub timeout_ms: u64,
    pub retries: u32,
    pub token: Option<String>,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self { enabled: true, base_url: None, timeout_ms: 30_000, retries: 3, token: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheStrategy {
    WriteThrough,
    WriteBehind,
    ReadThrough,
    CacheAside,
}

impl Default for CacheStrategy {
    fn default() -> Self {
        CacheStrategy::ReadThrough
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TtlConfig {
    pub components: u64,
    pub blocks: u64,
    pub metadata: u64,
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self { components: 604_800, blocks: 604_800, metadata: 3600 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionAlgorithm {
    Gzip,
    Brotli,
    None,
}

impl Default for CompressionAlgorithm {
    fn default() -> Self {
        CompressionAlgorithm::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub algorithm: CompressionAlgorithm,
    pub level: u8,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self { enabled: false, algorithm: CompressionAlgorithm::None, level: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub strategy: CacheStrategy,
    pub ttl: TtlConfig,
    pub compression: CompressionConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { strategy: CacheStrategy::default(), ttl: TtlConfig::default(), compression: CompressionConfig::default() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub batch_size: usize,
    pub concurrency: usize,
    pub queue_size: usize,
    pub flush_interval_ms: u64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self { batch_size: 100, concurrency: 10, queue_size: 1000, flush_interval_ms: 5000 }
    }
}

impl PerformanceConfig {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CircuitBreakerSettings {
    pub enabled: bool,
    pub threshold: u32,
    pub timeout_ms: u64,
    pub reset_timeout_ms: u64,
}

impl Default for CircuitBreakerSettings {
    fn default() -> Self {
        Self { enabled: true, threshold: 5, timeout_ms: 60_000, reset_timeout_ms: 60_000 }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub stats_interval_ms: u64,
    pub retention_days: u32,
    pub alerts: Vec<String>,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self { enabled: true, stats_interval_ms: 60_000, retention_days: 7, alerts: Vec::new() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Forces the origin tier out of the fallback chain regardless of
    /// `storage.origin.enabled`, so a lookup miss in memory and persistent
    /// fails fast instead of waiting on a tier known to be unreachable (see
    /// `HybridEngineBuilder::build`).
    pub offline_mode: bool,
    pub analytics: bool,
    pub auto_sync: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self { offline_mode: false, analytics: false, auto_sync: false }
    }
}
