//! API Handlers
//!
//! HTTP request handlers for the proxied catalog routes and the health check.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::cache::SharedCache;
use crate::config::Config;
use crate::error::{ProxyError, Result};
use crate::middleware::RateLimiter;
use crate::models::{validate_search, HealthResponse, MemoryUsage, ProxyEnvelope};
use crate::proxy::{Endpoint, ProxyOrchestrator};

/// Query parameters as received, sorted by name
type QueryParams = Query<BTreeMap<String, String>>;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache store, also owned by the orchestrator
    pub cache: SharedCache,
    /// Cache-aside request flow
    pub proxy: ProxyOrchestrator,
    /// Per-client limiter for the proxied routes
    pub limiter: Arc<RateLimiter>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Creates a new AppState around an orchestrator and its store.
    pub fn new(proxy: ProxyOrchestrator, limiter: RateLimiter) -> Self {
        Self {
            cache: proxy.cache().clone(),
            proxy,
            limiter: Arc::new(limiter),
            started_at: Instant::now(),
        }
    }

    /// Creates a new AppState from configuration around the given store.
    pub fn from_config(config: &Config, cache: SharedCache) -> anyhow::Result<Self> {
        let proxy = ProxyOrchestrator::from_config(config, cache)?;
        let limiter = RateLimiter::new(config.rate_limit_max, config.rate_limit_window());
        Ok(Self::new(proxy, limiter))
    }
}

/// Handler for GET /collection
pub async fn list_handler(
    State(state): State<AppState>,
    Query(query): QueryParams,
) -> Result<Json<ProxyEnvelope>> {
    Ok(Json(state.proxy.handle(Endpoint::Listing, query).await?))
}

/// Handler for GET /collection/search
///
/// Rejects a missing or blank `q` before the cache or upstream is consulted.
pub async fn search_handler(
    State(state): State<AppState>,
    Query(query): QueryParams,
) -> Result<Json<ProxyEnvelope>> {
    if let Some(error_msg) = validate_search(&query) {
        return Err(ProxyError::InvalidInput(error_msg));
    }

    Ok(Json(state.proxy.handle(Endpoint::Search, query).await?))
}

/// Handler for GET /collection/groups
pub async fn groups_handler(
    State(state): State<AppState>,
    Query(query): QueryParams,
) -> Result<Json<ProxyEnvelope>> {
    Ok(Json(state.proxy.handle(Endpoint::Groups, query).await?))
}

/// Handler for GET /collection/groups/:name
pub async fn group_listing_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): QueryParams,
) -> Result<Json<ProxyEnvelope>> {
    let endpoint = Endpoint::GroupListing(name);
    Ok(Json(state.proxy.handle(endpoint, query).await?))
}

/// Handler for GET /collection/:id
///
/// An encoded id that decodes to a static route name is rejected.
pub async fn item_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): QueryParams,
) -> Result<Json<ProxyEnvelope>> {
    let Some(endpoint) = Endpoint::item(id.clone()) else {
        return Err(ProxyError::InvalidInput(format!("Invalid item id '{}'", id)));
    };
    Ok(Json(state.proxy.handle(endpoint, query).await?))
}

/// Handler for GET /health
///
/// Reports uptime, process memory and cache statistics.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.cache.read().await.stats();
    let uptime = state.started_at.elapsed().as_secs_f64();

    Json(HealthResponse::healthy(uptime, memory_usage().await, stats))
}

/// Reads resident and virtual memory from `/proc/self/status` where available.
async fn memory_usage() -> MemoryUsage {
    let Ok(status) = tokio::fs::read_to_string("/proc/self/status").await else {
        return MemoryUsage::default();
    };
    parse_proc_status(&status)
}

fn parse_proc_status(status: &str) -> MemoryUsage {
    let field_mb = |name: &str| {
        status
            .lines()
            .find_map(|line| line.strip_prefix(name))
            .and_then(|rest| rest.trim().trim_end_matches("kB").trim().parse::<f64>().ok())
            .map(|kb| (kb / 1024.0 * 100.0).round() / 100.0)
    };

    MemoryUsage {
        resident_mb: field_mb("VmRSS:"),
        virtual_mb: field_mb("VmSize:"),
    }
}
