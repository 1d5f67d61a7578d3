//! Cache Entry Module
//!
//! Defines a single cached upstream payload with its expiration window.

use std::time::{Duration, Instant};

use serde_json::Value;

// == Cache Entry ==
/// A cached upstream payload plus the metadata needed to judge its freshness.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Decoded upstream JSON document
    pub value: Value,
    /// Insertion time
    pub created_at: Instant,
    /// Window after which the entry is stale
    pub ttl: Duration,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(value: Value, ttl: Duration) -> Self {
        Self::created_at(value, ttl, Instant::now())
    }

    /// Creates a new entry stamped with an explicit insertion time.
    pub fn created_at(value: Value, ttl: Duration, created_at: Instant) -> Self {
        Self {
            value,
            created_at,
            ttl,
        }
    }

    // == Is Expired ==
    /// Checks expiry against a given instant.
    ///
    /// An entry stays valid while `now - created_at <= ttl`; it only becomes
    /// stale once the elapsed time is strictly greater than the TTL.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) > self.ttl
    }
}
