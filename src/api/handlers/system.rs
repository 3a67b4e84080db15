//! System endpoints: health check and client configuration.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::ThemeMode;
use crate::realtime::{ConnectionPolicy, EventCategory, EventName};

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
    realtime_receivers: usize,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, current timestamp, and live realtime connections.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            realtime_receivers: state.event_bus.receiver_count(),
        }),
    )
}

/// Catalog entry.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventInfo {
    event: EventName,
    category: EventCategory,
    reserved: bool,
}

/// `GET /config/events` — List the realtime event catalog.
#[utoipa::path(
    get,
    path = "/config/events",
    tag = "System",
    summary = "List realtime events",
    description = "Returns every event name the realtime channel may carry. Reserved events are emitted only by the transport and handshake.",
    responses(
        (status = 200, description = "Event catalog", body = Vec<EventInfo>),
    )
)]
pub async fn events_handler() -> impl IntoResponse {
    let catalog: Vec<EventInfo> = EventName::ALL
        .into_iter()
        .map(|event| EventInfo {
            event,
            category: event.category(),
            reserved: event.is_reserved(),
        })
        .collect();
    (StatusCode::OK, Json(catalog))
}

/// `GET /config/realtime` — Connection policy for realtime clients.
#[utoipa::path(
    get,
    path = "/config/realtime",
    tag = "System",
    summary = "Realtime connection policy",
    description = "Returns the reconnection, timeout and transport settings clients should use.",
    responses(
        (status = 200, description = "Connection policy", body = ConnectionPolicy),
    )
)]
pub async fn realtime_policy_handler(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.realtime_policy.as_ref().clone()))
}

/// Theme response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ThemeResponse {
    theme: ThemeMode,
}

/// `GET /config/theme` — Active colour scheme.
#[utoipa::path(
    get,
    path = "/config/theme",
    tag = "System",
    summary = "Active theme",
    description = "Returns the colour scheme. It is fixed and cannot be changed.",
    responses(
        (status = 200, description = "Theme", body = ThemeResponse),
    )
)]
pub async fn theme_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ThemeResponse {
            theme: ThemeMode::ACTIVE,
        }),
    )
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/events", get(events_handler))
        .route("/config/realtime", get(realtime_policy_handler))
        .route("/config/theme", get(theme_handler))
}
