pub mod api;
pub mod config;
pub mod db;
pub mod entities;
pub mod scheduler;
pub mod services;

use tokio::signal;

use anyhow::Context;
pub use config::Config;
use scheduler::RetentionSweeper;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    info!(
        "MaarifaHub v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let api_state = api::create_app_state_from_config(config.clone(), prometheus_handle).await?;

    let sweeper = RetentionSweeper::new(api_state.store.clone(), config.retention.clone());
    let sweeper_handle = tokio::spawn(async move {
        if let Err(e) = sweeper.start().await {
            error!("Retention sweeper error: {}", e);
        }
    });

    let port = config.server.port;
    let app = api::router(api_state);
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let server_handle = tokio::spawn(async move {
        info!("API server running at http://0.0.0.0:{}", port);
        if let Err(e) = axum::serve(listener, app).await {
            error!("Server error: {}", e);
        }
    });

    info!("Running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    sweeper_handle.abort();
    server_handle.abort();
    info!("Stopped");

    Ok(())
}
