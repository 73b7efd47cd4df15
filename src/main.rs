//! CityWatch Server — realtime municipal SOS alerting.
//!
//! Main entry point that wires all crates together and starts the
//! server.

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use citywatch_core::config::AppConfig;
use citywatch_core::error::AppError;
use citywatch_core::traits::AlertStore;
use citywatch_realtime::RealtimeEngine;
use citywatch_store::{DatabasePool, MemoryAlertStore, PgAlertStore};

#[tokio::main]
async fn main() {
    let env = std::env::var("CITYWATCH_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting CityWatch v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Alert store ──────────────────────────────────────
    let store: Arc<dyn AlertStore> = match config.database.provider.as_str() {
        "memory" => {
            tracing::info!("Using in-memory alert store");
            Arc::new(MemoryAlertStore::new())
        }
        _ => {
            let pool = DatabasePool::connect(&config.database).await?;
            citywatch_store::migration::run_migrations(pool.pool()).await?;
            Arc::new(PgAlertStore::new(pool.into_pool()))
        }
    };

    // ── Step 2: Realtime engine ──────────────────────────────────
    let engine = Arc::new(RealtimeEngine::new(config.realtime.clone(), store.clone()));

    // ── Step 3: HTTP router ──────────────────────────────────────
    let config = Arc::new(config);
    let state = citywatch_api::AppState::new(config.clone(), store, engine.clone());
    let app = citywatch_api::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("CityWatch server listening on {addr}");

    // ── Step 4: Serve with graceful shutdown ─────────────────────
    let shutdown_engine = engine.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
            shutdown_engine.shutdown();
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("CityWatch server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
