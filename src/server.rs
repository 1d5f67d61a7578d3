//! Server lifecycle
//!
//! Serves the router until shutdown, then empties the cache.

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::cache::SharedCache;

/// Serves `app` on `listener` until `shutdown` resolves.
///
/// Client addresses are exposed as `ConnectInfo<SocketAddr>` for the rate limiter.
/// The cache is cleared only after in-flight requests have drained, so a miss
/// that completes during shutdown cannot leave an entry behind.
///
/// # Returns
/// The number of entries cleared.
pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    cache: SharedCache,
    shutdown: F,
) -> std::io::Result<usize>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;

    let cleared = cache.write().await.clear();
    info!("Cache cleared on shutdown: {} entries", cleared);
    Ok(cleared)
}
