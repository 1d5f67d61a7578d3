//! Cache Store Module
//!
//! Time-bounded key/value store for upstream payloads with hit/miss accounting.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::cache::{CacheEntry, CacheStats, Counters};

/// Handle to the store shared by the orchestrator, admin handlers and the sweep task.
pub type SharedCache = Arc<RwLock<CacheStore>>;

// == Cache Store ==
/// In-memory cache of upstream payloads keyed by canonical request key.
///
/// Validity is checked on every read; the background sweep only bounds memory.
#[derive(Debug, Default)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Process-lifetime hit/miss counters
    counters: Counters,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store wrapped for sharing across tasks.
    pub fn shared() -> SharedCache {
        Arc::new(RwLock::new(Self::new()))
    }

    // == Get ==
    /// Returns the cached value when present and fresh.
    ///
    /// Counts exactly one hit or one miss per call. A stale entry is removed
    /// and counted as a miss.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        self.get_at(key, Instant::now())
    }

    /// Same as [`CacheStore::get`] but judged against an explicit instant.
    pub fn get_at(&mut self, key: &str, now: Instant) -> Option<Value> {
        let expired = match self.entries.get(key) {
            None => {
                self.counters.record_miss();
                debug!("Cache MISS: {}", key);
                return None;
            }
            Some(entry) => entry.is_expired_at(now),
        };

        if expired {
            self.entries.remove(key);
            self.counters.record_miss();
            info!("Cache EXPIRED: {}", key);
            return None;
        }

        self.counters.record_hit();
        debug!("Cache HIT: {}", key);
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Set ==
    /// Inserts or overwrites an entry, restarting its expiration window.
    pub fn set(&mut self, key: impl Into<String>, value: Value, ttl: Duration) {
        self.set_at(key, value, ttl, Instant::now());
    }

    /// Same as [`CacheStore::set`] with an explicit insertion instant.
    pub fn set_at(&mut self, key: impl Into<String>, value: Value, ttl: Duration, now: Instant) {
        let key = key.into();
        debug!("Cache SET: {} (ttl: {}s)", key, ttl.as_secs());
        self.entries
            .insert(key, CacheEntry::created_at(value, ttl, now));
    }

    // == Delete ==
    /// Removes an entry. Returns whether something was removed; absent keys are not an error.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            debug!("Cache DEL: {}", key);
        }
        removed
    }

    // == Clear ==
    /// Removes every entry and returns how many were dropped. Counters are kept.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        info!("Cache cleared: {} entries removed", count);
        count
    }

    // == Contains ==
    /// Returns true if the key is held, fresh or not.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    // == Stats ==
    /// Returns a statistics snapshot.
    pub fn stats(&self) -> CacheStats {
        CacheStats::new(self.counters, self.entries.keys().cloned().collect())
    }

    // == Cleanup Expired ==
    /// Removes all stale entries and returns how many were removed.
    pub fn cleanup_expired(&mut self) -> usize {
        self.cleanup_expired_at(Instant::now())
    }

    /// Same as [`CacheStore::cleanup_expired`] judged against an explicit instant.
    pub fn cleanup_expired_at(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        before - self.entries.len()
    }

    // == Length ==
    /// Returns the number of entries not yet deleted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
