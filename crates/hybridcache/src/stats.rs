//! Per-tier counters, deduplication counters, and circuit-breaker snapshots
//! exposed via [`crate::HybridEngine::stats`].
//!
//! Grounded on the same point-in-time snapshot shape
//! `hybridcache-circuitbreaker` uses for [`CircuitMetrics`](hybridcache_circuitbreaker::CircuitMetrics):
//! counters live behind atomics/mutexes internally, and a `snapshot()` call
//! copies them out into a plain, serializable value safe to hand to a
//! dashboard or log line without holding any lock.

use hybridcache_dedup::DedupStats;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const LATENCY_SAMPLE_CAPACITY: usize = 1000;

#[derive(Default)]
struct TierCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    latencies_ms: Mutex<VecDeque<u64>>,
}

impl TierCounters {
    fn record_latency(&self, millis: u64) {
        let mut samples = self.latencies_ms.lock();
        if samples.len() >= LATENCY_SAMPLE_CAPACITY {
            samples.pop_front();
        }
        samples.push_back(millis);
    }

    fn snapshot(&self) -> TierStats {
        let mut samples: Vec<u64> = self.latencies_ms.lock().iter().copied().collect();
        samples.sort_unstable();
        TierStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            p50_ms: percentile(&samples, 0.50),
            p95_ms: percentile(&samples, 0.95),
            p99_ms: percentile(&samples, 0.99),
        }
    }
}

fn percentile(sorted_samples: &[u64], p: f64) -> u64 {
    if sorted_samples.is_empty() {
        return 0;
    }
    let rank = ((sorted_samples.len() as f64 - 1.0) * p).round() as usize;
    sorted_samples[rank.min(sorted_samples.len() - 1)]
}

/// Point-in-time counters for one tier, for `stats()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TierStats {
    pub hits: u64,
    pub misses: u64,
    pub p50_ms: u64,
    pub p95_ms: u64,
    pub p99_ms: u64,
}

impl TierStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// A consistent point-in-time view of every counter the registry tracks.
#[derive(Debug, Clone, Default)]
pub struct StatsSnapshot {
    pub tiers: HashMap<String, TierStats>,
    pub dedup: Option<DedupStats>,
}

/// Aggregates per-tier hit/miss/latency counters and (optionally) the
/// deduplicator's own stats into one `snapshot()`-able registry.
#[derive(Default)]
pub struct StatsRegistry {
    tiers: Mutex<HashMap<String, Arc<TierCounters>>>,
}

impl StatsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self, tier: &str, latency_ms: u64) {
        let counters = self.counters_for(tier);
        counters.hits.fetch_add(1, Ordering::Relaxed);
        counters.record_latency(latency_ms);
    }

    pub fn record_miss(&self, tier: &str, latency_ms: u64) {
        let counters = self.counters_for(tier);
        counters.misses.fetch_add(1, Ordering::Relaxed);
        counters.record_latency(latency_ms);
    }

    fn counters_for(&self, tier: &str) -> Arc<TierCounters> {
        let mut tiers = self.tiers.lock();
        tiers.entry(tier.to_string()).or_insert_with(|| Arc::new(TierCounters::default())).clone()
    }

    /// Copies out a consistent view of every tier's counters.
    pub fn snapshot(&self, dedup: Option<DedupStats>) -> StatsSnapshot {
        let tiers = self.tiers.lock();
        StatsSnapshot {
            tiers: tiers.iter().map(|(name, counters)| (name.clone(), counters.snapshot())).collect(),
            dedup,
        }
    }
}
