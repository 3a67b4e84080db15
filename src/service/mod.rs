//! Service layer: orchestration between HTTP handlers and the domain.
//!
//! [`SessionService`] drives per-session role routing, [`EventService`]
//! validates and publishes realtime events through the
//! [`crate::domain::EventBus`], and [`SubscriptionProxy`] relays
//! subscription requests upstream.

pub mod event_service;
pub mod session_service;
pub mod subscription_proxy;

pub use event_service::EventService;
pub use session_service::SessionService;
pub use subscription_proxy::{SubscriptionProxy, UpstreamReply};
