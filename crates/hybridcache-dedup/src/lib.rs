//! Request deduplication (singleflight) for hybridcache tier fetches.
//!
//! A [`RequestDeduplicator`] ensures that concurrent calls for the same key
//! share a single in-flight operation instead of each driving their own copy
//! of the (often expensive, rate-limited) factory. This prevents a cache
//! stampede: N callers missing the same key at once should result in exactly
//! one upstream call, with all N receiving the same result.
//!
//! # How It Works
//!
//! 1. The first caller for a given key becomes the *leader*: it registers the
//!    factory's future and starts driving it.
//! 2. Subsequent callers for the same key become *followers*: they await a
//!    clone of the same future instead of invoking the factory again.
//! 3. Once the future resolves, the entry is removed so the next miss for
//!    that key starts a fresh call rather than replaying a stale result.
//!
//! # Requirements
//!
//! - The key type must implement `Hash + Eq + Clone + Send + Sync`
//! - The result type (`T`) and error type (`E`) must implement `Clone`, since
//!   both the success and the failure are broadcast to every waiter
//!
//! # Prior Art
//!
//! This pattern is also known as:
//! - **Singleflight** (Go's `golang.org/x/sync/singleflight`)
//! - **Request deduplication** / **request collapsing**
//!
//! # Example
//!
//! ```
//! use hybridcache_dedup::{DedupConfig, RequestDeduplicator};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! # async fn example() {
//! let dedup: RequestDeduplicator<String, i32, String> =
//!     RequestDeduplicator::new(DedupConfig::new("tool-fetch"));
//! let calls = Arc::new(AtomicUsize::new(0));
//!
//! let c = Arc::clone(&calls);
//! let result = dedup
//!     .dedupe("weather:nyc".to_string(), move || {
//!         let c = Arc::clone(&c);
//!         async move {
//!             c.fetch_add(1, Ordering::SeqCst);
//!             Ok::<_, String>(72)
//!         }
//!     })
//!     .await;
//! assert_eq!(result, Ok(72));
//! # }
//! ```

mod config;
mod events;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use hashbrown::HashMap;
use parking_lot::Mutex;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

pub use config::{DedupConfig, DedupConfigBuilder};
pub use events::DedupEvent;

struct InFlight<T, E> {
    future: Shared<BoxFuture<'static, Result<T, E>>>,
    joins: Arc<AtomicUsize>,
}

impl<T, E> Clone for InFlight<T, E> {
    fn clone(&self) -> Self {
        Self {
            future: self.future.clone(),
            joins: Arc::clone(&self.joins),
        }
    }
}

/// Point-in-time counters for a `RequestDeduplicator`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DedupStats {
    pub total_requests: u64,
    pub deduplicated: u64,
    pub in_flight: u64,
}

impl DedupStats {
    /// Fraction of requests that were served by coalescing onto an
    /// already-in-flight call, in `[0.0, 1.0]`.
    pub fn dedup_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.deduplicated as f64 / self.total_requests as f64
        }
    }
}

#[derive(Default)]
struct Counters {
    total_requests: AtomicU64,
    deduplicated: AtomicU64,
    in_flight: AtomicU64,
}

/// Deduplicates concurrent calls to the same key behind a single in-flight
/// future.
pub struct RequestDeduplicator<K, T, E> {
    name: String,
    inflight: Mutex<HashMap<K, InFlight<T, E>>>,
    counters: Counters,
    event_listeners: hybridcache_core::events::EventListeners<DedupEvent>,
}

impl<K, T, E> RequestDeduplicator<K, T, E>
where
    K: Hash + Eq + Clone + std::fmt::Debug + Send + Sync + 'static,
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    pub fn new(config: DedupConfig) -> Self {
        Self {
            name: config.name,
            inflight: Mutex::new(HashMap::new()),
            counters: Counters::default(),
            event_listeners: config.event_listeners,
        }
    }

    /// Runs `factory` for `key`, coalescing concurrent calls for the same key
    /// onto a single execution.
    pub async fn dedupe<F, Fut>(&self, key: K, factory: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.counters.total_requests.fetch_add(1, Ordering::Relaxed);
        let key_repr = format!("{key:?}");

        let (entry, is_leader) = {
            let mut map = self.inflight.lock();
            if let Some(existing) = map.get(&key) {
                existing.joins.fetch_add(1, Ordering::Relaxed);
                (existing.clone(), false)
            } else {
                let boxed: BoxFuture<'static, Result<T, E>> = Box::pin(factory());
                let entry = InFlight {
                    future: boxed.shared(),
                    joins: Arc::new(AtomicUsize::new(0)),
                };
                map.insert(key.clone(), entry.clone());
                (entry, true)
            }
        };

        if is_leader {
            self.counters.in_flight.fetch_add(1, Ordering::Relaxed);
            self.event_listeners.emit(&DedupEvent::Leader {
                name: self.name.clone(),
                timestamp: Instant::now(),
                key: key_repr.clone(),
            });
        } else {
            self.counters.deduplicated.fetch_add(1, Ordering::Relaxed);
            self.event_listeners.emit(&DedupEvent::Coalesced {
                name: self.name.clone(),
                timestamp: Instant::now(),
                key: key_repr.clone(),
            });
        }

        let result = entry.future.clone().await;

        if is_leader {
            let joins = {
                let mut map = self.inflight.lock();
                map.remove(&key);
                entry.joins.load(Ordering::Relaxed)
            };
            self.counters.in_flight.fetch_sub(1, Ordering::Relaxed);
            self.event_listeners.emit(&DedupEvent::Settled {
                name: self.name.clone(),
                timestamp: Instant::now(),
                key: key_repr.clone(),
                waiters: joins,
            });
        }

        result
    }

    /// Whether `key` currently has an in-flight call.
    pub fn is_in_flight(&self, key: &K) -> bool {
        self.inflight.lock().contains_key(key)
    }

    /// A snapshot of this deduplicator's counters.
    pub fn stats(&self) -> DedupStats {
        DedupStats {
            total_requests: self.counters.total_requests.load(Ordering::Relaxed),
            deduplicated: self.counters.deduplicated.load(Ordering::Relaxed),
            in_flight: self.counters.in_flight.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    struct TestError(String);

    #[tokio::test]
    async fn single_request_passes_through() {
        let dedup: RequestDeduplicator<String, String, TestError> = RequestDeduplicator::new(DedupConfig::new("t"));
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);

        let result = dedup
            .dedupe("key".to_string(), move || {
                let c = Arc::clone(&c);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, TestError>("value".to_string())
                }
            })
            .await;

        assert_eq!(result.unwrap(), "value");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(dedup.stats().total_requests, 1);
        assert_eq!(dedup.stats().deduplicated, 0);
    }

    #[tokio::test]
    async fn concurrent_requests_for_same_key_coalesce_onto_one_call() {
        let dedup: Arc<RequestDeduplicator<String, String, TestError>> =
            Arc::new(RequestDeduplicator::new(DedupConfig::new("t")));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..5 {
            let dedup = Arc::clone(&dedup);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                dedup
                    .dedupe("same-key".to_string(), move || {
                        let calls = Arc::clone(&calls);
                        async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(30)).await;
                            Ok::<_, TestError>("shared".to_string())
                        }
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "shared");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = dedup.stats();
        assert_eq!(stats.total_requests, 5);
        assert_eq!(stats.deduplicated, 4);
        assert_eq!(stats.in_flight, 0);
    }

    #[tokio::test]
    async fn different_keys_execute_separately() {
        let dedup: Arc<RequestDeduplicator<String, String, TestError>> =
            Arc::new(RequestDeduplicator::new(DedupConfig::new("t")));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for i in 0..3 {
            let dedup = Arc::clone(&dedup);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                dedup
                    .dedupe(format!("key-{i}"), move || {
                        let calls = Arc::clone(&calls);
                        async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Ok::<_, TestError>(format!("value-{i}"))
                        }
                    })
                    .await
            }));
        }

        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn error_propagates_to_every_waiter() {
        let dedup: Arc<RequestDeduplicator<String, String, TestError>> =
            Arc::new(RequestDeduplicator::new(DedupConfig::new("t")));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..3 {
            let dedup = Arc::clone(&dedup);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                dedup
                    .dedupe("same-key".to_string(), move || {
                        let calls = Arc::clone(&calls);
                        async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(30)).await;
                            Err::<String, _>(TestError("boom".to_string()))
                        }
                    })
                    .await
            }));
        }

        for handle in handles {
            assert!(handle.await.unwrap().is_err());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn entry_is_removed_after_settling_so_the_next_call_is_fresh() {
        let dedup: RequestDeduplicator<String, String, TestError> = RequestDeduplicator::new(DedupConfig::new("t"));
        let calls = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&calls);
        dedup
            .dedupe("key".to_string(), move || {
                let c = Arc::clone(&c);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, TestError>("first".to_string())
                }
            })
            .await
            .unwrap();
        assert!(!dedup.is_in_flight(&"key".to_string()));

        let c = Arc::clone(&calls);
        let result = dedup
            .dedupe("key".to_string(), move || {
                let c = Arc::clone(&c);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, TestError>("second".to_string())
                }
            })
            .await;

        assert_eq!(result.unwrap(), "second");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
