//! The notification record and its closed event taxonomy.

use hybridcache_core::Severity;
use std::time::Instant;

/// The closed set of health-relevant events a tier or the engine can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// A tier's storage backend failed an operation outright.
    StorageFailure,
    /// The origin API is responding, but slowly or with partial results.
    ApiDegraded,
    /// A caller was served a stale value because fresher tiers failed.
    ServingStale,
    /// A caller was served a value with fields missing.
    PartialData,
    /// A tier's circuit breaker tripped open.
    CircuitBreakerOpen,
    /// A tier's error rate crossed an operator-relevant threshold.
    HighErrorRate,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::StorageFailure => "storage-failure",
            NotificationKind::ApiDegraded => "api-degraded",
            NotificationKind::ServingStale => "serving-stale",
            NotificationKind::PartialData => "partial-data",
            NotificationKind::CircuitBreakerOpen => "circuit-breaker-open",
            NotificationKind::HighErrorRate => "high-error-rate",
        }
    }
}

/// A single health-relevant event.
#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: NotificationKind,
    pub tier: String,
    pub severity: Severity,
    pub message: String,
    pub timestamp: Instant,
    pub key: Option<String>,
    pub context: Option<String>,
}

impl Notification {
    pub fn new(kind: NotificationKind, tier: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            tier: tier.into(),
            severity,
            message: message.into(),
            timestamp: Instant::now(),
            key: None,
            context: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}
