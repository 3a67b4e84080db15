//! Authenticated identity as supplied by the external auth service.
//!
//! The gateway never writes these records. It holds a read-only copy for
//! the duration of a session and only inspects the role to decide where
//! the session lands.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Closed set of roles assigned at login.
///
/// Serialized in `SCREAMING_SNAKE_CASE`. The legacy spelling `CUSTOMER`
/// is accepted on input as a synonym of [`UserRole::User`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Borrower / customer.
    #[serde(alias = "CUSTOMER")]
    User,
    /// Back-office administrator.
    Admin,
    /// Administrator with platform-wide privileges.
    SuperAdmin,
    /// Credit underwriter.
    Underwriter,
    /// Collections field or desk agent.
    CollectionAgent,
    /// Finance manager.
    FinanceManager,
    /// Risk analyst.
    RiskAnalyst,
    /// Customer support agent.
    SupportAgent,
}

impl UserRole {
    /// Every role, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::User,
        Self::Admin,
        Self::SuperAdmin,
        Self::Underwriter,
        Self::CollectionAgent,
        Self::FinanceManager,
        Self::RiskAnalyst,
        Self::SupportAgent,
    ];

    /// Returns the wire spelling of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
            Self::SuperAdmin => "SUPER_ADMIN",
            Self::Underwriter => "UNDERWRITER",
            Self::CollectionAgent => "COLLECTION_AGENT",
            Self::FinanceManager => "FINANCE_MANAGER",
            Self::RiskAnalyst => "RISK_ANALYST",
            Self::SupportAgent => "SUPPORT_AGENT",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role string is outside the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" | "CUSTOMER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            "SUPER_ADMIN" => Ok(Self::SuperAdmin),
            "UNDERWRITER" => Ok(Self::Underwriter),
            "COLLECTION_AGENT" => Ok(Self::CollectionAgent),
            "FINANCE_MANAGER" => Ok(Self::FinanceManager),
            "RISK_ANALYST" => Ok(Self::RiskAnalyst),
            "SUPPORT_AGENT" => Ok(Self::SupportAgent),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Account lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Account in good standing.
    Active,
    /// Account deactivated by its owner.
    Inactive,
    /// Temporarily suspended by an operator.
    Suspended,
    /// Awaiting KYC / contact verification.
    PendingVerification,
    /// Permanently blocked.
    Blocked,
}

/// Identity record for an authenticated session.
///
/// `role` is `None` when the auth service sent no role or a role outside
/// [`UserRole`]; routing treats both cases as "send to login".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    /// Identifier issued by the auth service.
    pub id: String,
    /// Login email.
    #[serde(default)]
    pub email: String,
    /// Mobile number.
    #[serde(default)]
    pub mobile: String,
    /// Assigned role, if recognized.
    #[serde(default, deserialize_with = "lenient_role")]
    pub role: Option<UserRole>,
    /// Account status.
    #[serde(default = "default_status")]
    pub status: AccountStatus,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl AuthUser {
    /// Creates a minimal active user with the given id and role.
    #[must_use]
    pub fn new(id: impl Into<String>, role: Option<UserRole>) -> Self {
        Self {
            id: id.into(),
            email: String::new(),
            mobile: String::new(),
            role,
            status: AccountStatus::Active,
            name: None,
            avatar: None,
            created_at: None,
            updated_at: None,
        }
    }
}

const fn default_status() -> AccountStatus {
    AccountStatus::Active
}

/// Accepts any JSON value for `role`; anything that is not a known role
/// string becomes `None`.
fn lenient_role<'de, D>(deserializer: D) -> Result<Option<UserRole>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let role = match raw {
        Some(serde_json::Value::String(s)) => match s.parse::<UserRole>() {
            Ok(role) => Some(role),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring role outside catalog");
                None
            }
        },
        _ => None,
    };
    Ok(role)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn parse_user(json: &str) -> AuthUser {
        let Ok(user) = serde_json::from_str::<AuthUser>(json) else {
            panic!("user should deserialize: {json}");
        };
        user
    }

    #[test]
    fn role_wire_names_round_trip_through_from_str() {
        for role in UserRole::ALL {
            assert_eq!(role.as_str().parse::<UserRole>().ok(), Some(role));
        }
    }

    #[test]
    fn customer_is_user_alias() {
        assert_eq!("CUSTOMER".parse::<UserRole>().ok(), Some(UserRole::User));
        let user = parse_user(r#"{"id":"u1","role":"CUSTOMER"}"#);
        assert_eq!(user.role, Some(UserRole::User));
    }

    #[test]
    fn role_parsing_is_case_sensitive() {
        assert!("admin".parse::<UserRole>().is_err());
    }

    #[test]
    fn unknown_role_deserializes_to_none() {
        let user = parse_user(r#"{"id":"u1","role":"AUDITOR"}"#);
        assert_eq!(user.role, None);
    }

    #[test]
    fn missing_or_null_role_deserializes_to_none() {
        assert_eq!(parse_user(r#"{"id":"u1"}"#).role, None);
        assert_eq!(parse_user(r#"{"id":"u1","role":null}"#).role, None);
        assert_eq!(parse_user(r#"{"id":"u1","role":7}"#).role, None);
    }

    #[test]
    fn full_record_deserializes() {
        let user = parse_user(
            r#"{
                "id": "u-42",
                "email": "agent@example.com",
                "mobile": "+15550100",
                "role": "COLLECTION_AGENT",
                "status": "PENDING_VERIFICATION",
                "name": "Sam",
                "createdAt": "2024-01-01T00:00:00Z"
            }"#,
        );
        assert_eq!(user.role, Some(UserRole::CollectionAgent));
        assert_eq!(user.status, AccountStatus::PendingVerification);
        assert_eq!(user.name.as_deref(), Some("Sam"));
        assert!(user.created_at.is_some());
        assert!(user.updated_at.is_none());
    }

    #[test]
    fn serializes_camel_case() {
        let user = AuthUser::new("u1", Some(UserRole::RiskAnalyst));
        let json = serde_json::to_string(&user).unwrap_or_default();
        assert!(json.contains(r#""role":"RISK_ANALYST""#));
        assert!(json.contains(r#""status":"ACTIVE""#));
        assert!(!json.contains("createdAt"));
    }
}
