// Not a test target on its own; included by the integration tests.
#![allow(dead_code, missing_docs)]

use std::net::SocketAddr;
use std::time::Duration;

use lendflow_gateway::config::{GatewayConfig, LogFormat};
use lendflow_gateway::realtime::ConnectionPolicy;

pub fn test_config(upstream_url: String) -> GatewayConfig {
    GatewayConfig {
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        subscription_upstream_url: upstream_url,
        upstream_timeout: Duration::from_secs(2),
        request_timeout: Duration::from_secs(5),
        event_bus_capacity: 64,
        session_idle_timeout: Duration::from_secs(60),
        max_sessions: 1_000,
        log_format: LogFormat::Pretty,
        realtime_policy: ConnectionPolicy::default(),
    }
}

/// Serves the gateway on an ephemeral port and returns its address.
pub async fn spawn_gateway(upstream_url: String) -> Option<SocketAddr> {
    spawn_gateway_with(test_config(upstream_url)).await
}

/// Same as [`spawn_gateway`] with a caller-tuned configuration.
pub async fn spawn_gateway_with(config: GatewayConfig) -> Option<SocketAddr> {
    let state = lendflow_gateway::build_state(&config).ok()?;
    let app = lendflow_gateway::build_app(state, &config);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await.ok()?;
    let addr = listener.local_addr().ok()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Some(addr)
}

/// A port with nothing listening on it.
pub async fn closed_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.ok();
    listener
        .and_then(|l| l.local_addr().ok())
        .map_or(9, |a| a.port())
}
