//! feedcache - Multi-tier indicator feed cache server
//!
//! Serves macro indicator feeds through a two-tier cache with single-flight
//! fetch orchestration.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::sync::RwLock;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feedcache::api::create_router;
use feedcache::{
    feeds, spawn_prune_task, AppState, CacheStore, Config, Orchestrator, PerformanceMonitor,
};

/// Main entry point for the feed cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the two-tier cache store (creates the disk directory)
/// 4. Register the built-in feed set
/// 5. Start the background disk prune task
/// 6. Create Axum router with all endpoints
/// 7. Start HTTP server on configured port
/// 8. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feedcache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting feedcache server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: memory={} entries / {} bytes, default_ttl={}s, disk_dir={}, port={}",
        config.memory_max_entries,
        config.memory_max_bytes,
        config.default_ttl_secs,
        config.disk_cache_dir,
        config.server_port
    );

    let store = CacheStore::new(
        config.memory_max_entries,
        config.memory_max_bytes,
        &config.disk_cache_dir,
        config.default_ttl(),
    )
    .with_context(|| format!("opening cache directory {}", config.disk_cache_dir))?;
    let cache = Arc::new(RwLock::new(store));
    info!("Cache store initialized");

    let registry = feeds::demo_registry(config.fetch_timeout());
    info!("Registered {} feeds: {:?}", registry.len(), registry.names());

    let monitor = Arc::new(PerformanceMonitor::default());
    let orchestrator = Orchestrator::new(Arc::clone(&cache), monitor);

    let prune_handle = spawn_prune_task(cache, config.prune_interval_secs);
    info!("Background disk prune task started");

    let app = create_router(AppState::new(orchestrator, registry));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(prune_handle))
        .await
        .context("serving HTTP")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the prune task and allows graceful shutdown.
async fn shutdown_signal(prune_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
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

    prune_handle.abort();
    warn!("Prune task aborted");
}
