//! lendflow-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::time::Duration;

use tracing_subscriber::EnvFilter;

use lendflow_gateway::config::{GatewayConfig, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting lendflow-gateway");

    let state = lendflow_gateway::build_state(&config)?;
    let _sweeper = std::sync::Arc::clone(&state.session_service)
        .spawn_sweeper(config.session_idle_timeout.max(Duration::from_secs(1)));
    let app = lendflow_gateway::build_app(state, &config);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(
        addr = %config.listen_addr,
        upstream = %config.subscription_upstream_url,
        "server listening"
    );

    axum::serve(listener, app).await?;

    Ok(())
}
