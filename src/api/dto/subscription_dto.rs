//! Subscription proxy DTOs.

use serde::Serialize;
use utoipa::ToSchema;

/// Fixed failure envelope returned when the upstream cannot be reached.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriptionFailure {
    /// Always `false`.
    pub success: bool,
    /// Always `"Failed to subscribe"`.
    pub message: &'static str,
}

impl SubscriptionFailure {
    /// The one failure envelope.
    pub const FAILED: Self = Self {
        success: false,
        message: "Failed to subscribe",
    };
}
