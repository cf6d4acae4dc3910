//! Events emitted by a `RequestDeduplicator` as requests join or settle.

use hybridcache_core::events::ComponentEvent;
use std::time::Instant;

/// An event emitted by a `RequestDeduplicator` instance.
#[derive(Debug, Clone)]
pub enum DedupEvent {
    /// A new key started its own factory call (it was not in flight).
    Leader {
        name: String,
        timestamp: Instant,
        key: String,
    },
    /// A request joined an already-in-flight call for the same key.
    Coalesced {
        name: String,
        timestamp: Instant,
        key: String,
    },
    /// The in-flight call for a key settled (succeeded or failed) and its
    /// entry was removed.
    Settled {
        name: String,
        timestamp: Instant,
        key: String,
        waiters: usize,
    },
}

impl ComponentEvent for DedupEvent {
    fn event_type(&self) -> &'static str {
        match self {
            DedupEvent::Leader { .. } => "leader",
            DedupEvent::Coalesced { .. } => "coalesced",
            DedupEvent::Settled { .. } => "settled",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            DedupEvent::Leader { timestamp, .. }
            | DedupEvent::Coalesced { timestamp, .. }
            | DedupEvent::Settled { timestamp, .. } => *timestamp,
        }
    }

    fn component_name(&self) -> &str {
        match self {
            DedupEvent::Leader { name, .. } | DedupEvent::Coalesced { name, .. } | DedupEvent::Settled { name, .. } => name,
        }
    }
}
