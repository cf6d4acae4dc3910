//! Events emitted by a [`FallbackChainHandler`](crate::FallbackChainHandler)
//! as it walks the tier chain for one lookup.

use hybridcache_core::events::ComponentEvent;
use std::time::{Duration, Instant};

/// Events emitted while resolving a single `get_with_fallback` call.
#[derive(Debug, Clone)]
pub enum FallbackEvent {
    /// A tier produced a usable (complete or partial) value.
    TierHit {
        tier: String,
        timestamp: Instant,
        key: String,
    },

    /// A tier's guarded call failed (retries and circuit breaker included);
    /// the chain moves on to the next tier.
    TierFailed {
        tier: String,
        timestamp: Instant,
        key: String,
        reason: String,
    },

    /// A value past its TTL was served from the emergency stale pass.
    ServingStale {
        tier: String,
        timestamp: Instant,
        key: String,
        age: Duration,
    },

    /// A value missing only optional fields was served as-is.
    ServingPartial {
        tier: String,
        timestamp: Instant,
        key: String,
        missing_fields: Vec<String>,
    },

    /// Every tier failed or returned nothing usable, and the emergency
    /// stale pass (if attempted) found nothing either.
    AllTiersExhausted {
        timestamp: Instant,
        key: String,
        attempted: Vec<String>,
    },
}

impl ComponentEvent for FallbackEvent {
    fn event_type(&self) -> &'static str {
        match self {
            Self::TierHit { .. } => "tier_hit",
            Self::TierFailed { .. } => "tier_failed",
            Self::ServingStale { .. } => "serving_stale",
            Self::ServingPartial { .. } => "serving_partial",
            Self::AllTiersExhausted { .. } => "all_tiers_exhausted",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            Self::TierHit { timestamp, .. }
            | Self::TierFailed { timestamp, .. }
            | Self::ServingStale { timestamp, .. }
            | Self::ServingPartial { timestamp, .. }
            | Self::AllTiersExhausted { timestamp, .. } => *timestamp,
        }
    }

    fn component_name(&self) -> &str {
        match self {
            Self::TierHit { tier, .. }
            | Self::TierFailed { tier, .. }
            | Self::ServingStale { tier, .. }
            | Self::ServingPartial { tier, .. } => tier,
            Self::AllTiersExhausted { .. } => "fallback",
        }
    }
}
