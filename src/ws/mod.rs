//! WebSocket layer: upgrade handler and per-connection loop.
//!
//! The endpoint at `/ws` speaks the envelope defined in
//! [`crate::realtime`]: clients authenticate with `auth` and then receive
//! broadcast envelopes plus the ones addressed to them.

pub mod connection;
pub mod handler;
