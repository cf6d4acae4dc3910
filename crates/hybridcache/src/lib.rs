//! A resilient multi-tier caching engine for a slow, rate-limited upstream
//! source: a hot in-memory tier, a durable local tier, and a remote origin
//! tier behind one facade, with request deduplication, per-tier circuit
//! breakers, retry/backoff, partial-response completion, and a fallback
//! chain across tiers.
//!
//! # Quick Start
//!
//! ```no_run
//! use hybridcache::{EngineConfig, HybridEngine};
//! use std::sync::Arc;
//!
//! # async fn example(adapter: Arc<dyn hybridcache::UpstreamAdapter>) -> Result<(), Box<dyn std::error::Error>> {
//! let engine = HybridEngine::builder(EngineConfig::default())
//!     .adapter(adapter)
//!     .build()?;
//!
//! let value = engine.get("component:react:button").await?;
//! println!("{value:?}");
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **[`MemoryTier`](hybridcache_tiers::MemoryTier)** — byte-capacity-bounded,
//!   LRU by default, first stop for every read and write.
//! - **[`PersistentTier`](hybridcache_tiers::PersistentTier)** — a `sled`
//!   database surviving process restarts.
//! - **[`OriginTier`](hybridcache_tiers::OriginTier)** — wraps an
//!   [`UpstreamAdapter`] behind a short-TTL buffer to absorb request bursts
//!   against a rate-limited API.
//!
//! Each tier is guarded by its own
//! [`CircuitBreaker`](hybridcache_circuitbreaker::CircuitBreaker) and a
//! [`RecoveryManager`](hybridcache_recovery::RecoveryManager) running a
//! reduced retry budget; [`hybridcache_fallback::FallbackChainHandler`] walks
//! the tiers in order for one key, repairing a record still missing a
//! required field with a completion fetch against the origin tier before
//! falling back to a stale copy once every tier has failed. A
//! [`hybridcache_dedup::RequestDeduplicator`] collapses
//! concurrent lookups for the same key onto a single in-flight call, and a
//! [`hybridcache_notifier::DegradedNotifier`] gives callers a queryable view
//! of what's currently degraded.
//!
//! # Cache Strategies
//!
//! [`CacheConfig::strategy`] controls how [`HybridEngine::set`] writes land:
//! write-through and read-through write memory and persistent synchronously,
//! write-behind queues the persistent write (dropping it with a critical
//! notification if the queue is full rather than blocking the caller), and
//! cache-aside invalidates instead of writing, relying on the next miss to
//! repopulate from origin.

mod adapter;
mod config;
mod engine;
mod error;
mod stats;

pub use adapter::{AdapterError, AdapterOriginFetcher, UpstreamAdapter};
pub use config::{
    CacheConfig, CacheStrategy, CircuitBreakerSettings, CompressionAlgorithm, CompressionConfig, EngineConfig, EvictionKind,
    FeatureFlags, MemoryConfig, MonitoringConfig, OriginConfig, PerformanceConfig, PersistentConfig, StorageConfig, StorageType,
    TtlConfig,
};
pub use engine::{HybridEngine, HybridEngineBuilder};
pub use error::{ConfigError, EngineError};
pub use stats::{StatsRegistry, StatsSnapshot, TierStats};

pub use hybridcache_tiers::{CacheValue, Completeness};
