use anyhow::Context;
use mimalloc::MiMalloc;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::task;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use event_booking::{
    app,
    config::{Config, LogFormat},
    services::cleanup::SessionSweeper,
    AppState,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("Failed to load configuration")?;

    let registry = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log));
    match config.app.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    info!("Starting Event Booking API ({})", config.app.environment);

    let state = AppState::new(config.clone()).context("Failed to build application state")?;
    info!("Placeholder API at {}", state.placeholder.base_url());
    if state.simulation.faults_enabled() {
        info!("Fault injection is ON");
    }

    // --- Background tasks ---

    // Drop booking sessions abandoned by their clients
    let sweeper = SessionSweeper::new(
        state.bookings.clone(),
        Duration::from_secs(config.sessions.sweep_interval_seconds.max(1)),
    );
    task::spawn(sweeper.run());

    // --- Web server ---

    let addr: SocketAddr = format!("{}:{}", config.app.host, config.app.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.app.host, config.app.port))?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        // without a signal handler, run until killed
        Err(_) => std::future::pending().await,
    }
}
