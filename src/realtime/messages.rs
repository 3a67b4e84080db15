//! Realtime wire envelope.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::EventName;

/// Envelope carried over the realtime channel.
///
/// ```json
/// { "event": "loan:approved", "data": { "loanId": "L-1" }, "timestamp": 1700000000000, "userId": "u-1" }
/// ```
///
/// `event` is always a catalog member on anything this crate emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WsMessage {
    /// Event name.
    pub event: EventName,
    /// Event-specific payload.
    #[serde(default)]
    pub data: serde_json::Value,
    /// Milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Recipient (outbound) or sender (inbound). Absent means broadcast.
    #[serde(default, rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Inbound shape before the event name is checked against the catalog.
#[derive(Debug, Deserialize)]
struct RawEnvelope {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
    #[serde(default)]
    timestamp: Option<i64>,
    #[serde(default, rename = "userId")]
    user_id: Option<String>,
}

impl WsMessage {
    /// Creates a broadcast envelope stamped with the current time.
    #[must_use]
    pub fn new(event: EventName, data: serde_json::Value) -> Self {
        Self {
            event,
            data,
            timestamp: Some(chrono::Utc::now().timestamp_millis()),
            user_id: None,
        }
    }

    /// Addresses the envelope to a single user.
    #[must_use]
    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Parses an inbound frame.
    ///
    /// Returns `Ok(None)` when the frame is well-formed but names an event
    /// outside the catalog; callers drop such frames.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the frame is not an envelope at all.
    pub fn decode(text: &str) -> Result<Option<Self>, serde_json::Error> {
        let raw: RawEnvelope = serde_json::from_str(text)?;
        let Ok(event) = raw.event.parse::<EventName>() else {
            tracing::debug!(event = %raw.event, "ignoring event outside catalog");
            return Ok(None);
        };
        Ok(Some(Self {
            event,
            data: raw.data,
            timestamp: raw.timestamp,
            user_id: raw.user_id,
        }))
    }

    /// Serializes the envelope to a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the payload cannot be serialized.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
