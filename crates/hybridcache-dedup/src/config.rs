//! Configuration for a [`crate::RequestDeduplicator`].

use hybridcache_core::events::EventListeners;

use crate::events::DedupEvent;

/// Configuration for a `RequestDeduplicator`.
pub struct DedupConfig {
    pub(crate) name: String,
    pub(crate) event_listeners: EventListeners<DedupEvent>,
}

impl DedupConfig {
    /// Creates a configuration with the given name (used in metrics/tracing
    /// and surfaced via events).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            event_listeners: EventListeners::new(),
        }
    }

    pub fn builder(name: impl Into<String>) -> DedupConfigBuilder {
        DedupConfigBuilder::new(name)
    }
}

/// Builder for a [`DedupConfig`].
pub struct DedupConfigBuilder {
    name: String,
    event_listeners: EventListeners<DedupEvent>,
}

impl DedupConfigBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            event_listeners: EventListeners::new(),
        }
    }

    pub fn on_coalesced<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        use hybridcache_core::events::FnListener;
        self.event_listeners.add(FnListener::new(move |event: &DedupEvent| {
            if let DedupEvent::Coalesced { key, .. } = event {
                f(key);
            }
        }));
        self
    }

    pub fn build(self) -> DedupConfig {
        DedupConfig {
            name: self.name,
            event_listeners: self.event_listeners,
        }
    }
}
