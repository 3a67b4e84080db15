//! Landing areas of the application and the role → area mapping.

use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;

use super::UserRole;

/// A distinct section of the application reserved for one or more roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    /// Sign-in page. Fallback for absent or unrecognized roles.
    Login,
    /// Administration area (`ADMIN`, `SUPER_ADMIN`).
    Admin,
    /// Customer self-service area (`USER`, `CUSTOMER`).
    User,
    /// Underwriting workbench.
    Underwriter,
    /// Collections desk.
    CollectionAgent,
    /// Finance dashboard.
    FinanceManager,
    /// Risk dashboard.
    RiskAnalyst,
    /// Support desk.
    SupportAgent,
}

impl Destination {
    /// Resolves the landing area for a role. Total over the input: `None`
    /// lands on [`Destination::Login`].
    #[must_use]
    pub const fn for_role(role: Option<UserRole>) -> Self {
        match role {
            Some(UserRole::Admin | UserRole::SuperAdmin) => Self::Admin,
            Some(UserRole::User) => Self::User,
            Some(UserRole::Underwriter) => Self::Underwriter,
            Some(UserRole::CollectionAgent) => Self::CollectionAgent,
            Some(UserRole::FinanceManager) => Self::FinanceManager,
            Some(UserRole::RiskAnalyst) => Self::RiskAnalyst,
            Some(UserRole::SupportAgent) => Self::SupportAgent,
            None => Self::Login,
        }
    }

    /// Returns the navigation path for this area.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Admin => "/admin",
            Self::User => "/user",
            Self::Underwriter => "/underwriter",
            Self::CollectionAgent => "/collection-agent",
            Self::FinanceManager => "/finance-manager",
            Self::RiskAnalyst => "/risk-analyst",
            Self::SupportAgent => "/support-agent",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
