//! Realtime publishing DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::realtime::WsMessage;

/// Request body for `POST /events`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PublishEventRequest {
    /// Event name; must be a non-reserved catalog member.
    pub event: String,
    /// Event payload.
    #[serde(default)]
    pub data: serde_json::Value,
    /// Recipient. Omit to broadcast.
    #[serde(default, rename = "userId")]
    pub user_id: Option<String>,
}

/// Response body for `POST /events` (202 Accepted).
#[derive(Debug, Serialize, ToSchema)]
pub struct PublishEventResponse {
    /// Envelope as emitted on the bus.
    pub message: WsMessage,
    /// Live connections the envelope is addressed to.
    pub delivered: usize,
}
