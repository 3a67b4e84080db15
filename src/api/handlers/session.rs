//! Routing session handlers: open, route, close.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, post};
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{OpenSessionResponse, RouteRequest, RouteResponse};
use crate::app_state::AppState;
use crate::domain::SessionId;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /sessions` — Open a routing session.
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "Sessions",
    summary = "Open a routing session",
    description = "Creates a session whose router starts in the loading phase. Sessions left idle past the configured timeout expire, and when the session limit is reached the least recently used one is evicted.",
    responses(
        (status = 201, description = "Session opened", body = OpenSessionResponse),
    )
)]
pub async fn open_session(State(state): State<AppState>) -> impl IntoResponse {
    let session_id = state.session_service.open().await;
    (
        StatusCode::CREATED,
        Json(OpenSessionResponse {
            session_id,
            created_at: Utc::now(),
        }),
    )
}

/// `POST /sessions/:id/route` — Evaluate the session's auth state.
///
/// # Errors
///
/// Returns [`GatewayError::SessionNotFound`] if the session is not open.
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/route",
    tag = "Sessions",
    summary = "Resolve landing area",
    description = "Evaluates the user and loading flag reported by the auth service. While loading, the state is `loading`. Once settled, the first evaluation returns `navigate` with the destination path; repeats of the same settled state return `navigated`.",
    params(
        ("id" = uuid::Uuid, Path, description = "Session UUID"),
    ),
    request_body = RouteRequest,
    responses(
        (status = 200, description = "Routing state", body = RouteResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
    )
)]
pub async fn route_session(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<RouteRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let session_id = SessionId::from_uuid(id);
    let view = state
        .session_service
        .route(session_id, req.user.as_ref(), req.is_loading)
        .await?;
    Ok(Json(RouteResponse::from_view(session_id, view)))
}

/// `DELETE /sessions/:id` — Close a routing session.
///
/// # Errors
///
/// Returns [`GatewayError::SessionNotFound`] if the session is not open.
#[utoipa::path(
    delete,
    path = "/api/v1/sessions/{id}",
    tag = "Sessions",
    summary = "Close a routing session",
    params(
        ("id" = uuid::Uuid, Path, description = "Session UUID"),
    ),
    responses(
        (status = 204, description = "Session closed"),
        (status = 404, description = "Session not found", body = ErrorResponse),
    )
)]
pub async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    state
        .session_service
        .close(SessionId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Session routes (nested under `/api/v1`).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(open_session))
        .route("/sessions/{id}", delete(close_session))
        .route("/sessions/{id}/route", post(route_session))
}
