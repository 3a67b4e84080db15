//! Routing session DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AuthUser, RouterView, SessionId};

/// Response body for `POST /sessions` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct OpenSessionResponse {
    /// Session identifier.
    #[schema(value_type = String, format = Uuid)]
    pub session_id: SessionId,
    /// Server creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Request body for `POST /sessions/:id/route`, as reported by the auth
/// collaborator.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    /// Authenticated user, absent when signed out.
    #[serde(default)]
    pub user: Option<AuthUser>,
    /// Whether the session state is still being fetched.
    #[serde(default)]
    pub is_loading: bool,
}

/// Routing state returned to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RouteState {
    /// Show a loading indicator; nothing decided yet.
    Loading,
    /// Navigate to `destination` now.
    Navigate,
    /// Navigation to `destination` was already issued.
    Navigated,
}

/// Response body for `POST /sessions/:id/route`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RouteResponse {
    /// Session identifier.
    #[schema(value_type = String, format = Uuid)]
    pub session_id: SessionId,
    /// Router state after evaluation.
    pub state: RouteState,
    /// Destination path, once resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

impl RouteResponse {
    /// Builds the response for a router evaluation.
    #[must_use]
    pub fn from_view(session_id: SessionId, view: RouterView) -> Self {
        let (state, destination) = match view {
            RouterView::Loading => (RouteState::Loading, None),
            RouterView::Navigate(d) => (RouteState::Navigate, Some(d)),
            RouterView::Navigated(d) => (RouteState::Navigated, Some(d)),
        };
        Self {
            session_id,
            state,
            destination: destination.map(|d| d.path().to_string()),
        }
    }
}
