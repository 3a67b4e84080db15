//! # lendflow-gateway
//!
//! Role-based session routing and realtime event gateway for the lendflow
//! lending platform.
//!
//! Two contracts live here. The **session role router** maps an
//! authenticated user to the one landing area its role allows, navigating
//! once per settled auth state. The **realtime event contract** fixes the
//! catalog of event names, the envelope they travel in, and the bounded
//! reconnection policy clients follow.
//!
//! ## Architecture
//!
//! ```text
//! Browsers (HTTP, WebSocket)          RealtimeClient (realtime/)
//!     │                                        │
//!     ├── REST Handlers (api/)                 │
//!     ├── WS Handler (ws/) ◀───────────────────┘
//!     │
//!     ├── SessionService / EventService / SubscriptionProxy (service/)
//!     │
//!     ├── SessionRegistry ─ RoleRouter (domain/)
//!     ├── EventBus (domain/)
//!     │
//!     └── Upstream subscription service (reqwest)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod realtime;
pub mod service;
pub mod ws;

use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::config::GatewayConfig;
use crate::domain::{EventBus, SessionRegistry};
use crate::error::GatewayError;
use crate::service::{EventService, SessionService, SubscriptionProxy};

/// Wires the domain and service layers from configuration.
///
/// # Errors
///
/// Returns [`GatewayError::Internal`] if the upstream HTTP client cannot be
/// built.
pub fn build_state(config: &GatewayConfig) -> Result<AppState, GatewayError> {
    let event_bus = EventBus::new(config.event_bus_capacity);
    let registry = SessionRegistry::with_limits(config.session_idle_timeout, config.max_sessions);
    let session_service = Arc::new(SessionService::new(Arc::new(registry)));
    let event_service = Arc::new(EventService::new(event_bus.clone()));
    let subscription_proxy = Arc::new(SubscriptionProxy::new(
        config.subscription_upstream_url.clone(),
        config.upstream_timeout,
    )?);

    Ok(AppState {
        session_service,
        event_service,
        subscription_proxy,
        event_bus,
        realtime_policy: Arc::new(config.realtime_policy.clone()),
    })
}

/// Builds the full HTTP application: REST routes, `/ws`, and layers.
pub fn build_app(state: AppState, config: &GatewayConfig) -> Router {
    let routes = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws::handler::ws_handler));
    with_layers(routes, config).with_state(state)
}

/// Applies the request timeout, tracing and CORS layers.
fn with_layers<S>(router: Router<S>, config: &GatewayConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
