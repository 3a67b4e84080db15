//! Realtime event contract: catalog, envelope, policy, and client.
//!
//! Producers and consumers on both sides of `/ws` share these types. The
//! server side of the socket lives in [`crate::ws`].

pub mod client;
pub mod events;
pub mod messages;
pub mod policy;
pub mod reconnect;

pub use client::{RealtimeClient, RealtimeError};
pub use events::{EventCategory, EventName, UnknownEvent};
pub use messages::WsMessage;
pub use policy::{ConnectionPolicy, TransportKind};
pub use reconnect::{ConnectionStatus, DisconnectReason, ReconnectDecision, Reconnector};
