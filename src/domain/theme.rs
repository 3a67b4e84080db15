//! Application theme.
//!
//! The product ships a single light theme. It is a constant, not a setting:
//! there is nothing to toggle and no mutation path.

use serde::Serialize;
use utoipa::ToSchema;

/// Colour scheme of the web application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Light scheme.
    Light,
}

impl ThemeMode {
    /// The theme every page renders with.
    pub const ACTIVE: Self = Self::Light;
}
