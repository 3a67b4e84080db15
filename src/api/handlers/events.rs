//! Realtime event publishing handler.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{PublishEventRequest, PublishEventResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /events` — Publish an event to realtime clients.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for a blank name or recipient,
/// and [`GatewayError::UnknownEvent`] or [`GatewayError::ReservedEvent`]
/// when the name is not publishable.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "Realtime",
    summary = "Publish a realtime event",
    description = "Wraps the payload in an envelope and hands it to every live WebSocket connection. With `userId` set only connections authenticated as that user receive it. `delivered` counts the connections the envelope is addressed to.",
    request_body = PublishEventRequest,
    responses(
        (status = 202, description = "Event published", body = PublishEventResponse),
        (status = 400, description = "Blank, unknown or reserved event", body = ErrorResponse),
    )
)]
pub async fn publish_event(
    State(state): State<AppState>,
    Json(req): Json<PublishEventRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let (message, delivered) = state
        .event_service
        .publish(&req.event, req.data, req.user_id)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(PublishEventResponse { message, delivered }),
    ))
}

/// Event routes (nested under `/api/v1`).
pub fn routes() -> Router<AppState> {
    Router::new().route("/events", post(publish_event))
}
