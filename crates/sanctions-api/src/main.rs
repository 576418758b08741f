//! # sanctions-api: Binary Entry Point
//!
//! Starts the HTTP server and, when a geocoder is configured, the daily
//! reconciliation scheduler. Both stop on Ctrl-C; a running pass is allowed
//! to finish.

use sanctions_api::state::AppConfig;
use sanctions_engine::run_daily;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = AppConfig::from_env()?;
    let port = config.port;

    // Optional: absent DATABASE_URL means in-memory only.
    let db_pool = sanctions_api::db::init_pool().await.map_err(|e| {
        tracing::error!("Database initialization failed: {e}");
        e
    })?;

    let state = sanctions_api::bootstrap::bootstrap(config, db_pool)
        .await
        .map_err(|e| {
            tracing::error!("Bootstrap failed: {e}");
            e
        })?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("shutdown signal received");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                tracing::error!("cannot listen for shutdown signal: {e}");
                // Keep the sender alive so receivers do not see a closed channel.
                std::future::pending::<()>().await;
            }
        }
    });

    let scheduler = state.reconciler.clone().map(|reconciler| {
        let schedule = reconciler.config().schedule;
        tokio::spawn(run_daily(reconciler, schedule, shutdown_signal(shutdown_rx.clone())))
    });

    let app = sanctions_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Sanctions API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_rx))
        .await?;

    if let Some(handle) = scheduler {
        handle.await?;
    }
    tracing::info!("Sanctions API stopped");
    Ok(())
}

/// Resolves once shutdown has been requested.
async fn shutdown_signal(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

/// Install the global subscriber: `RUST_LOG` filter (default `info`), JSON
/// lines when `LOG_FORMAT=json`.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
