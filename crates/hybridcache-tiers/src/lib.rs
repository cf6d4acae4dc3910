//! Memory, persistent, and origin storage tiers.
//!
//! Every tier implements the same [`Tier`] trait so the fallback chain can
//! treat them uniformly: [`MemoryTier`] is the hot in-process cache,
//! [`PersistentTier`] durably survives a restart via `sled`, and
//! [`OriginTier`] wraps whatever fetches from the upstream source of
//! record. [`KeyCodec`]/[`ResourceKey`] give every tier a shared key
//! fingerprint, and [`PartialResponseHandler`] judges whether a record is
//! complete enough to serve.

mod error;
mod eviction;
mod events;
mod glob;
mod key;
mod memory;
mod origin;
mod partial;
mod persistent;
mod store;
mod tier;
mod value;

pub use error::TierError;
pub use eviction::EvictionPolicy;
pub use events::TierEvent;
pub use key::{KeyCodec, ResourceKey, ResourceKind};
pub use memory::{MemoryTier, MemoryTierConfig};
pub use origin::{OriginFetcher, OriginTier, OriginTierConfig};
pub use partial::{Completeness, PartialResponseHandler};
pub use persistent::{PersistentTier, PersistentTierConfig};
pub use tier::Tier;
pub use value::{CacheValue, EntryMeta, StoredEntry};
