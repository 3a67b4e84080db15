//! Event service: validates producer envelopes and publishes them.

use crate::domain::EventBus;
use crate::error::GatewayError;
use crate::realtime::{EventName, WsMessage};

/// Publishes domain events onto the realtime bus.
///
/// Producers name events by their wire string; only catalog members that
/// are not reserved for the transport get through.
#[derive(Debug, Clone)]
pub struct EventService {
    event_bus: EventBus,
}

impl EventService {
    /// Creates a new `EventService`.
    #[must_use]
    pub const fn new(event_bus: EventBus) -> Self {
        Self { event_bus }
    }

    /// Validates and publishes an event.
    ///
    /// Returns the envelope as sent and the number of live connections it
    /// is addressed to.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for a blank event name or
    /// recipient, [`GatewayError::UnknownEvent`] for names outside the
    /// catalog and [`GatewayError::ReservedEvent`] for connection and auth
    /// events.
    pub fn publish(
        &self,
        event: &str,
        data: serde_json::Value,
        user_id: Option<String>,
    ) -> Result<(WsMessage, usize), GatewayError> {
        if event.trim().is_empty() {
            return Err(GatewayError::InvalidRequest("event is required".to_string()));
        }
        if user_id.as_deref().is_some_and(|id| id.trim().is_empty()) {
            return Err(GatewayError::InvalidRequest(
                "userId must not be blank".to_string(),
            ));
        }
        let name: EventName = event
            .parse()
            .map_err(|_| GatewayError::UnknownEvent(event.to_string()))?;
        if name.is_reserved() {
            return Err(GatewayError::ReservedEvent(event.to_string()));
        }

        let mut message = WsMessage::new(name, data);
        message.user_id = user_id;
        let delivered = self.event_bus.publish(message.clone());

        tracing::debug!(event = %name, user_id = ?message.user_id, delivered, "event published");
        Ok((message, delivered))
    }
}
