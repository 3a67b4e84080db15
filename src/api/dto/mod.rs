//! Data Transfer Objects for REST request/response serialization.

pub mod event_dto;
pub mod session_dto;
pub mod subscription_dto;

pub use event_dto::*;
pub use session_dto::*;
pub use subscription_dto::*;
