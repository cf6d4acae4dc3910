//! A bounded log of health-relevant events plus deduplicated, degraded-state
//! views over it.
//!
//! [`DegradedNotifier`] is the engine's single point of observability for
//! "something is wrong" signals: a tier's circuit breaker tripping, a fetch
//! falling back to stale or partial data, a storage backend erroring
//! outright. Every tier and the engine itself call `notify()`; dashboards and
//! health checks call `active_issues()`/`is_degraded()`.
//!
//! ```
//! use hybridcache_core::Severity;
//! use hybridcache_notifier::{DegradedNotifier, DegradedNotifierConfig, Notification, NotificationKind};
//!
//! let notifier = DegradedNotifier::new(DegradedNotifierConfig::default());
//! notifier.notify(Notification::new(
//!     NotificationKind::CircuitBreakerOpen,
//!     "origin",
//!     Severity::Error,
//!     "origin circuit tripped open",
//! ));
//!
//! assert!(notifier.is_degraded(60));
//! ```

mod notification;

use hashbrown::HashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub use notification::{Notification, NotificationKind};
pub use hybridcache_core::Severity;

/// Tuning for a [`DegradedNotifier`].
#[derive(Debug, Clone, Copy)]
pub struct DegradedNotifierConfig {
    /// Maximum number of notifications retained regardless of age.
    pub capacity: usize,
    /// Notifications older than this are evicted on the next `notify()`.
    pub retention: Duration,
}

impl Default for DegradedNotifierConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            retention: Duration::from_secs(3600),
        }
    }
}

/// One row of the `active_issues()` view: a `(kind, tier)` group within the
/// requested window.
#[derive(Debug, Clone)]
pub struct ActiveIssue {
    pub kind: NotificationKind,
    pub tier: String,
    pub severity: Severity,
    pub first_seen: Instant,
    pub last_seen: Instant,
    pub occurrences: u32,
}

struct Subscriber {
    id: u64,
    callback: Box<dyn Fn(&Notification) + Send + Sync>,
}

struct Inner {
    config: DegradedNotifierConfig,
    ring: Mutex<VecDeque<Notification>>,
    subscribers: Mutex<Vec<Subscriber>>,
    next_id: AtomicU64,
}

/// Bounded, time-retained log of [`Notification`]s with pub/sub and
/// degraded-state views.
#[derive(Clone)]
pub struct DegradedNotifier {
    inner: Arc<Inner>,
}

impl DegradedNotifier {
    pub fn new(config: DegradedNotifierConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                ring: Mutex::new(VecDeque::new()),
                subscribers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Appends `notification` to the ring, evicts anything now past
    /// retention, logs at the event's severity, and invokes every
    /// subscriber.
    pub fn notify(&self, notification: Notification) {
        #[cfg(feature = "tracing")]
        {
            let tier = &notification.tier;
            let kind = notification.kind.as_str();
            match notification.severity {
                Severity::Info => tracing::info!(tier = %tier, kind, "{}", notification.message),
                Severity::Warning => tracing::warn!(tier = %tier, kind, "{}", notification.message),
                Severity::Error | Severity::Critical => {
                    tracing::error!(tier = %tier, kind, "{}", notification.message)
                }
            }
        }

        #[cfg(feature = "metrics")]
        metrics::counter!(
            "hybridcache_notifications_total",
            "kind" => notification.kind.as_str(),
            "tier" => notification.tier.clone()
        )
        .increment(1);

        {
            let mut ring = self.inner.ring.lock();
            if ring.len() >= self.inner.config.capacity {
                ring.pop_front();
            }
            ring.push_back(notification.clone());

            let cutoff = Instant::now();
            let retention = self.inner.config.retention;
            while ring
                .front()
                .map(|n| cutoff.duration_since(n.timestamp) > retention)
                .unwrap_or(false)
            {
                ring.pop_front();
            }
        }

        for sub in self.inner.subscribers.lock().iter() {
            (sub.callback)(&notification);
        }
    }

    /// Registers `callback` to be invoked on every future `notify()`. Returns
    /// a handle whose `unsubscribe()` removes it.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.subscribers.lock().push(Subscriber {
            id,
            callback: Box::new(callback),
        });
        SubscriptionHandle {
            id,
            inner: Arc::clone(&self.inner),
        }
    }

    /// Groups events from the last `window_min` minutes by `(kind, tier)`,
    /// escalating each group to its highest-observed severity and sorting by
    /// severity descending, then recency.
    pub fn active_issues(&self, window_min: u64) -> Vec<ActiveIssue> {
        let window = Duration::from_secs(window_min * 60);
        let now = Instant::now();
        let ring = self.inner.ring.lock();

        let mut groups: HashMap<(NotificationKind, String), ActiveIssue> = HashMap::new();
        for n in ring.iter().filter(|n| now.duration_since(n.timestamp) <= window) {
            groups
                .entry((n.kind, n.tier.clone()))
                .and_modify(|issue| {
                    issue.occurrences += 1;
                    issue.severity = issue.severity.max(n.severity);
                    if n.timestamp < issue.first_seen {
                        issue.first_seen = n.timestamp;
                    }
                    if n.timestamp > issue.last_seen {
                        issue.last_seen = n.timestamp;
                    }
                })
                .or_insert_with(|| ActiveIssue {
                    kind: n.kind,
                    tier: n.tier.clone(),
                    severity: n.severity,
                    first_seen: n.timestamp,
                    last_seen: n.timestamp,
                    occurrences: 1,
                });
        }

        let mut issues: Vec<ActiveIssue> = groups.into_values().collect();
        issues.sort_by(|a, b| b.severity.cmp(&a.severity).then_with(|| b.last_seen.cmp(&a.last_seen)));
        issues
    }

    /// True iff any active issue in the window is `error` or `critical`.
    pub fn is_degraded(&self, window_min: u64) -> bool {
        self.active_issues(window_min)
            .iter()
            .any(|issue| matches!(issue.severity, Severity::Error | Severity::Critical))
    }

    /// Number of notifications currently retained (for diagnostics/tests).
    pub fn len(&self) -> usize {
        self.inner.ring.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A handle returned by [`DegradedNotifier::subscribe`]; dropping it does
/// nothing, call [`unsubscribe`](Self::unsubscribe) to stop receiving events.
pub struct SubscriptionHandle {
    id: u64,
    inner: Arc<Inner>,
}

impl SubscriptionHandle {
    pub fn unsubscribe(self) {
        self.inner.subscribers.lock().retain(|sub| sub.id != self.id);
    }
}
