//! Shard Cache - A sharded in-memory cache server
//!
//! Provides a string key-value cache split over independently locked LRU
//! shards, with a background monitor that evicts under memory pressure.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shard_cache::api::{create_router, AppState};
use shard_cache::{
    spawn_memory_monitor, Config, MemoryMonitor, MonitorConfig, ProcessMemorySampler, ShardedCache,
};

/// Main entry point for the cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the sharded cache
/// 4. Start the background memory monitor
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shard_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Shard Cache Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: shards={}, max_key={}B, max_value={}B, port={}, ceiling={}B, threshold={:.2}, interval={}s, batch={}",
        config.num_shards,
        config.max_key_size,
        config.max_value_size,
        config.server_port,
        config.max_memory_bytes,
        config.memory_threshold,
        config.monitor_interval,
        config.eviction_batch_size
    );

    // One cache instance, shared by handle with the monitor and the router
    let cache = Arc::new(ShardedCache::from_config(&config));
    info!("Sharded cache initialized with {} shards", cache.shard_count());

    let monitor = MemoryMonitor::new(
        Arc::clone(&cache),
        Box::new(ProcessMemorySampler::new()),
        MonitorConfig::from_config(&config),
    );
    let state = AppState::with_shared(cache, monitor.status());
    let monitor_handle = spawn_memory_monitor(monitor);
    info!("Background memory monitor started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(monitor_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the memory monitor and allows graceful shutdown.
async fn shutdown_signal(monitor_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
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

    monitor_handle.abort();
    info!("Memory monitor stopped");
}
