//! Facade-level errors: configuration validation on top of the shared
//! [`EngineError`](hybridcache_core::EngineError) every tier and recovery
//! crate already surfaces.

use thiserror::Error;

pub use hybridcache_core::EngineError;

/// Raised by [`crate::EngineConfig::validate`] when the configuration
/// violates one of the business rules checked at startup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("no storage provider is enabled")]
    NoStorageEnabled,

    #[error("memory capacity ({memory_bytes} bytes) must be strictly less than persistent capacity ({persistent_bytes} bytes)")]
    MemoryNotSmallerThanPersistent { memory_bytes: u64, persistent_bytes: u64 },

    #[error("metadata ttl ({metadata_s}s) must be <= component ttl ({components_s}s) and block ttl ({blocks_s}s)")]
    MetadataTtlTooLong { metadata_s: u64, components_s: u64, blocks_s: u64 },

    #[error("compression level must be in 1..=9, got {0}")]
    InvalidCompressionLevel(u8),

    #[error("circuit_breaker.reset_timeout_ms ({reset_timeout_ms}) must be >= circuit_breaker.timeout_ms ({timeout_ms})")]
    ResetTimeoutTooShort { timeout_ms: u64, reset_timeout_ms: u64 },

    #[error("storage.type = memory-only requires storage.memory.enabled = true")]
    MemoryOnlyRequiresMemory,

    #[error("storage.type = persistent-only requires storage.persistent.enabled = true")]
    PersistentOnlyRequiresPersistent,
}
