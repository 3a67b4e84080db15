//! Subscription creation proxy handler.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::SubscriptionFailure;
use crate::app_state::AppState;

/// `POST /api/subscription` — Create a subscription upstream.
///
/// The upstream status and JSON body are returned unchanged. Any transport
/// failure or non-JSON upstream body becomes the fixed failure envelope
/// with status 500; the cause is logged only.
#[utoipa::path(
    post,
    path = "/api/subscription",
    tag = "Subscriptions",
    summary = "Create a subscription",
    description = "Forwards the JSON body to the upstream subscription service and relays its answer.",
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Upstream answer, relayed as-is", body = serde_json::Value),
        (status = 500, description = "Upstream unreachable", body = SubscriptionFailure),
    )
)]
pub async fn create_subscription(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    match state.subscription_proxy.forward(&body).await {
        Ok(reply) => {
            let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, Json(reply.body)).into_response()
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                upstream = %state.subscription_proxy.upstream_url(),
                "subscription proxy failed"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SubscriptionFailure::FAILED),
            )
                .into_response()
        }
    }
}

/// Proxy routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/subscription", post(create_subscription))
}
