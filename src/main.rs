//! Catalog Proxy server binary.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_proxy::cache::CacheStore;
use catalog_proxy::{
    create_router, serve, spawn_cleanup_task, spawn_rate_limit_prune_task, AppState, Config,
};

/// Main entry point for the catalog proxy.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache store and upstream client
/// 4. Optionally warm the cache
/// 5. Start background sweep tasks
/// 6. Serve until SIGINT/SIGTERM, then clear the cache
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_proxy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Catalog Proxy");

    let config = Config::from_env();
    info!(
        "Configuration loaded: upstream={}/{}, port={}, cleanup_interval={}s, rate_limit={}/{}s",
        config.upstream_base_url,
        config.upstream_collection,
        config.server_port,
        config.cleanup_interval,
        config.rate_limit_max,
        config.rate_limit_window
    );

    let cache = CacheStore::shared();
    let state = AppState::from_config(&config, cache.clone())
        .context("failed to build upstream client")?;

    if config.warm_cache {
        state.proxy.warm().await;
    }

    let sweep_interval = Duration::from_secs(config.cleanup_interval);
    let tasks = vec![
        spawn_cleanup_task(cache.clone(), sweep_interval),
        spawn_rate_limit_prune_task(state.limiter.clone(), sweep_interval),
    ];
    info!("Background sweep tasks started");

    let app = create_router(state, &config.cors_origins);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    serve(listener, app, cache, shutdown_signal(tasks))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown, aborts the background tasks.
async fn shutdown_signal(tasks: Vec<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    for task in tasks {
        task.abort();
    }
    warn!("Background tasks aborted");
}
