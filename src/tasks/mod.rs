//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Cache sweep: removes stale cache entries at the configured interval
//! - Limiter prune: forgets clients idle for a full rate-limit window

mod cleanup;

pub use cleanup::{spawn_cleanup_task, spawn_rate_limit_prune_task};
