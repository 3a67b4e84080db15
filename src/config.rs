//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;
use std::time::Duration;

use crate::domain::session_registry::{DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_SESSIONS};
use crate::realtime::ConnectionPolicy;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Upstream endpoint that creates subscriptions.
    pub subscription_upstream_url: String,

    /// Timeout for a single upstream request.
    pub upstream_timeout: Duration,

    /// Timeout for handling any inbound HTTP request.
    pub request_timeout: Duration,

    /// Capacity of the EventBus broadcast channel.
    pub event_bus_capacity: usize,

    /// Idle time after which an unclosed routing session is dropped.
    pub session_idle_timeout: Duration,

    /// Upper bound on simultaneously open routing sessions.
    pub max_sessions: usize,

    /// Log output format.
    pub log_format: LogFormat,

    /// Connection policy advertised to realtime clients.
    pub realtime_policy: ConnectionPolicy,
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()?;

        let subscription_upstream_url = std::env::var("SUBSCRIPTION_UPSTREAM_URL")
            .unwrap_or_else(|_| "http://localhost:8080/api/subscriptions".to_string());

        let upstream_timeout = Duration::from_secs(parse_env("UPSTREAM_TIMEOUT_SECS", 10));
        let request_timeout = Duration::from_secs(parse_env("REQUEST_TIMEOUT_SECS", 30));
        let event_bus_capacity = parse_env("EVENT_BUS_CAPACITY", 10_000);
        let session_idle_timeout = Duration::from_secs(parse_env(
            "SESSION_IDLE_TIMEOUT_SECS",
            DEFAULT_IDLE_TIMEOUT.as_secs(),
        ));
        let max_sessions = parse_env("MAX_SESSIONS", DEFAULT_MAX_SESSIONS);

        let log_format = match std::env::var("LOG_FORMAT").ok().as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let defaults = ConnectionPolicy::default();
        let realtime_policy = ConnectionPolicy {
            reconnection: parse_env_bool("REALTIME_RECONNECTION", defaults.reconnection),
            reconnection_delay: parse_env(
                "REALTIME_RECONNECT_DELAY_MS",
                defaults.reconnection_delay,
            ),
            reconnection_delay_max: parse_env(
                "REALTIME_RECONNECT_DELAY_MAX_MS",
                defaults.reconnection_delay_max,
            ),
            reconnection_attempts: parse_env(
                "REALTIME_RECONNECT_ATTEMPTS",
                defaults.reconnection_attempts,
            ),
            timeout: parse_env("REALTIME_TIMEOUT_MS", defaults.timeout),
            transports: defaults.transports,
        };

        Ok(Self {
            listen_addr,
            subscription_upstream_url,
            upstream_timeout,
            request_timeout,
            event_bus_capacity,
            session_idle_timeout,
            max_sessions,
            log_format,
            realtime_policy,
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().as_deref() {
        Some("true") | Some("TRUE") | Some("1") => true,
        Some("false") | Some("FALSE") | Some("0") => false,
        _ => default,
    }
}
