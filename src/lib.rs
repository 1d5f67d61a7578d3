//! Catalog Proxy - A caching reverse proxy for a read-only catalog API
//!
//! Serves listing, search, group and item routes from an in-memory TTL cache,
//! falling back to the upstream API on a miss.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod proxy;
pub mod server;
pub mod tasks;
pub mod upstream;

pub use api::{create_router, AppState};
pub use config::Config;
pub use proxy::ProxyOrchestrator;
pub use server::serve;
pub use tasks::{spawn_cleanup_task, spawn_rate_limit_prune_task};
