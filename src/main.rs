use order_guard::api::{create_router, AppState};
use order_guard::config::Settings;
use order_guard::guard::{DuplicateGuard, GuardConfig, GuardSweeper};
use order_guard::observability::{init_logging, init_metrics, LogConfig};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;

    init_logging(&LogConfig::from(&settings.application))?;
    info!("Configuration loaded");

    let guard_config = GuardConfig::try_from(&settings.guard)?;
    let guard = Arc::new(DuplicateGuard::with_system_clock(guard_config)?);
    info!(
        cooldown_minutes = guard_config.cooldown.num_minutes(),
        sweep_interval_minutes = guard_config.sweep_interval.num_minutes(),
        sweep_threshold_minutes = guard_config.sweep_threshold.num_minutes(),
        "Duplicate guard initialized"
    );

    let sweeper = GuardSweeper::from_config(Arc::clone(&guard)).start();

    let mut state = AppState::new(Arc::clone(&guard));
    if settings.metrics.enabled {
        state = state.with_metrics(init_metrics()?);
        info!("Prometheus metrics enabled");
    }

    let listener = tokio::net::TcpListener::bind(settings.bind_address()).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.shutdown().await;
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
