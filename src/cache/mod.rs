//! Cache Module
//!
//! Time-bounded in-memory store for upstream payloads, plus cache key derivation.

mod entry;
mod key;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use key::{derive_key, RequestDescriptor};
pub use stats::{hit_rate, CacheStats, Counters};
pub use store::{CacheStore, SharedCache};
