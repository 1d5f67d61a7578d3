//! Cache Statistics Module
//!
//! Tracks process-lifetime hit/miss traffic and builds statistics snapshots.

use serde::Serialize;

// == Counters ==
/// Monotonic hit/miss counters owned by the cache store.
///
/// Clearing the store never resets these; they describe traffic, not population.
#[derive(Debug, Clone, Copy, Default)]
pub struct Counters {
    /// Fresh entries returned by `get`
    pub hits: u64,
    /// Absent or stale keys seen by `get`
    pub misses: u64,
}

impl Counters {
    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }
}

// == Cache Stats ==
/// Point-in-time statistics snapshot of the cache store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Entries not yet deleted (stale ones included until removed)
    pub size: usize,
    /// Cumulative hits
    pub hits: u64,
    /// Cumulative misses
    pub misses: u64,
    /// hits / (hits + misses), 0.0 before any traffic
    pub hit_rate: f64,
    /// Keys currently held, sorted
    pub keys: Vec<String>,
}

impl CacheStats {
    // == Constructor ==
    /// Builds a snapshot from the counters and the current key set.
    pub fn new(counters: Counters, mut keys: Vec<String>) -> Self {
        keys.sort();
        Self {
            size: keys.len(),
            hits: counters.hits,
            misses: counters.misses,
            hit_rate: hit_rate(counters.hits, counters.misses),
            keys,
        }
    }
}

// == Hit Rate ==
/// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
pub fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}
