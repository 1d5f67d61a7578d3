//! Cache administration handlers
//!
//! Statistics, clear-all and single-key invalidation. None of these are cached.

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::cache::CacheStats;
use crate::error::{ProxyError, Result};
use crate::models::{ClearResponse, DeleteResponse};

use super::AppState;

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.read().await.stats())
}

/// Handler for POST /cache/clear
///
/// Drops every entry; hit/miss counters keep their cumulative values.
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let cleared = state.cache.write().await.clear();
    Json(ClearResponse::new(cleared))
}

/// Handler for DELETE /cache/:key
///
/// The key arrives URL-encoded (`/collection?limit=10` as
/// `%2Fcollection%3Flimit%3D10`) and is decoded by the path extractor.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if !state.cache.write().await.delete(&key) {
        return Err(ProxyError::NotFound(format!(
            "Cache entry '{}' not found",
            key
        )));
    }

    info!("Cache entry invalidated: {}", key);
    Ok(Json(DeleteResponse::new(key)))
}
