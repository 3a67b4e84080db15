//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::realtime::ConnectionPolicy;
use crate::service::{EventService, SessionService, SubscriptionProxy};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Routing sessions.
    pub session_service: Arc<SessionService>,
    /// Realtime event publishing.
    pub event_service: Arc<EventService>,
    /// Subscription creation proxy.
    pub subscription_proxy: Arc<SubscriptionProxy>,
    /// Event bus for WebSocket connections.
    pub event_bus: EventBus,
    /// Policy advertised to realtime clients.
    pub realtime_policy: Arc<ConnectionPolicy>,
}
