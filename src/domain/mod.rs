//! Domain layer: identities, role routing, sessions, and the event bus.
//!
//! This module holds the server-side domain model: the authenticated user
//! record and its closed role set, the role → destination mapping, the
//! per-session [`RoleRouter`] state machine and the registry that owns the
//! routers, and the broadcast bus feeding realtime connections.

pub mod destination;
pub mod event_bus;
pub mod role_router;
pub mod session_id;
pub mod session_registry;
pub mod theme;
pub mod user;

pub use destination::Destination;
pub use event_bus::{EventBus, EventSubscription};
pub use role_router::{Navigator, RedirectRecorder, RoleRouter, RouterPhase, RouterView};
pub use session_id::SessionId;
pub use session_registry::SessionRegistry;
pub use theme::ThemeMode;
pub use user::{AccountStatus, AuthUser, UserRole};
