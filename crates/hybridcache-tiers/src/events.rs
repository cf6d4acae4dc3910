//! Events emitted by tier implementations for observability.

use hybridcache_core::events::ComponentEvent;
use std::time::Instant;

/// Events a [`crate::tier::Tier`] emits while serving `get`/`set`/`cleanup`.
#[derive(Debug, Clone)]
pub enum TierEvent {
    Hit { tier: String, timestamp: Instant, key: String },
    Miss { tier: String, timestamp: Instant, key: String },
    Eviction { tier: String, timestamp: Instant, key: String },
    WriteFailed { tier: String, timestamp: Instant, key: String, reason: String },
}

impl ComponentEvent for TierEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TierEvent::Hit { .. } => "hit",
            TierEvent::Miss { .. } => "miss",
            TierEvent::Eviction { .. } => "eviction",
            TierEvent::WriteFailed { .. } => "write_failed",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            TierEvent::Hit { timestamp, .. }
            | TierEvent::Miss { timestamp, .. }
            | TierEvent::Eviction { timestamp, .. }
            | TierEvent::WriteFailed { timestamp, .. } => *timestamp,
        }
    }

    fn component_name(&self) -> &str {
        match self {
            TierEvent::Hit { tier, .. }
            | TierEvent::Miss { tier, .. }
            | TierEvent::Eviction { tier, .. }
            | TierEvent::WriteFailed { tier, .. } => tier,
        }
    }
}
