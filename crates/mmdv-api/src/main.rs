//! # mmdv-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for the Mermaid validation service.
//! Binds to all interfaces on port 8080 unless configured otherwise.

use clap::Parser;
use mmdv_api::config::{LogFormat, ServeArgs};
use mmdv_api::state::AppState;

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServeArgs::parse();
    init_tracing(args.log_format);

    let app_config = args.app_config();
    let service_config = args.service_config();

    // Created once here so a misconfigured scratch path fails at startup.
    service_config.scratch_dir.ensure().await.map_err(|e| {
        tracing::error!("Scratch directory unavailable: {e}");
        e
    })?;

    tracing::info!(
        renderer = %service_config.renderer.program.display(),
        scratch_dir = %service_config.scratch_dir.path().display(),
        timeout_secs = service_config.renderer.timeout.as_secs(),
        max_concurrent_renders = ?service_config.max_concurrent_renders,
        "Validator configured"
    );

    let mut state = AppState::new(app_config.clone(), service_config);
    if args.metrics {
        let handle = mmdv_api::middleware::metrics::install_recorder().map_err(|e| {
            tracing::error!("Failed to install Prometheus recorder: {e}");
            e
        })?;
        state = state.with_metrics(handle);
    }

    let app = mmdv_api::app(state);

    let addr = app_config.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Mermaid validation service running on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
