//! Background Sweep Tasks
//!
//! Periodic removal of stale cache entries and idle rate-limiter clients.
//! Correctness never depends on these; they only bound memory.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;
use crate::middleware::RateLimiter;

/// Spawns a background task that periodically removes stale cache entries.
///
/// The task sleeps for the interval between runs and only holds the write
/// lock while scanning, so request handling is never blocked for longer than
/// one sweep.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = CacheStore::shared();
/// let sweep = spawn_cleanup_task(cache.clone(), Duration::from_secs(300));
/// // Later, during shutdown:
/// sweep.abort();
/// ```
pub fn spawn_cleanup_task(cache: SharedCache, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting cache sweep task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.write().await.cleanup_expired();

            if removed > 0 {
                info!("Cache sweep: removed {} expired entries", removed);
            } else {
                debug!("Cache sweep: no expired entries found");
            }
        }
    })
}

/// Spawns a background task that forgets rate-limiter clients idle for a full window.
pub fn spawn_rate_limit_prune_task(
    limiter: Arc<RateLimiter>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;

            let pruned = limiter.prune();
            if pruned > 0 {
                debug!("Rate limiter: pruned {} idle clients", pruned);
            }
        }
    })
}
