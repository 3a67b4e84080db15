//! Closed catalog of realtime event names.
//!
//! Names are exact, case-sensitive wire strings. Categories are the part
//! before the first colon (`loan:status:change` → `loan`); the connection
//! events and `notification` have no colon and form their own categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Every event the realtime channel may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum EventName {
    /// Transport connected.
    #[serde(rename = "connect")]
    Connect,
    /// Transport disconnected.
    #[serde(rename = "disconnect")]
    Disconnect,
    /// Transport or protocol error.
    #[serde(rename = "error")]
    Error,
    /// Client authentication request.
    #[serde(rename = "auth")]
    Auth,
    /// Authentication accepted.
    #[serde(rename = "auth:success")]
    AuthSuccess,
    /// Authentication rejected.
    #[serde(rename = "auth:error")]
    AuthError,
    /// User-facing notification.
    #[serde(rename = "notification")]
    Notification,
    /// Dashboard refresh.
    #[serde(rename = "dashboard:update")]
    DashboardUpdate,
    /// Metrics refresh.
    #[serde(rename = "metrics:update")]
    MetricsUpdate,
    /// Performance figures refresh.
    #[serde(rename = "performance:update")]
    PerformanceUpdate,
    /// New loan application received.
    #[serde(rename = "application:received")]
    ApplicationReceived,
    /// Loan application changed.
    #[serde(rename = "application:updated")]
    ApplicationUpdated,
    /// Loan status transition.
    #[serde(rename = "loan:status:change")]
    LoanStatusChange,
    /// Loan approved.
    #[serde(rename = "loan:approved")]
    LoanApproved,
    /// Loan rejected.
    #[serde(rename = "loan:rejected")]
    LoanRejected,
    /// Collections alert.
    #[serde(rename = "collection:alert")]
    CollectionAlert,
    /// Repayment received.
    #[serde(rename = "payment:received")]
    PaymentReceived,
    /// Compliance alert.
    #[serde(rename = "compliance:alert")]
    ComplianceAlert,
    /// Risk alert.
    #[serde(rename = "risk:alert")]
    RiskAlert,
    /// Support ticket assigned.
    #[serde(rename = "ticket:assigned")]
    TicketAssigned,
    /// Support ticket changed.
    #[serde(rename = "ticket:updated")]
    TicketUpdated,
}

/// Grouping of events by concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// `connect`, `disconnect`, `error`.
    Connection,
    /// `auth*`.
    Authentication,
    /// `notification`.
    Notification,
    /// Dashboard, metrics and performance refreshes.
    Dashboard,
    /// Loan applications.
    Application,
    /// Loan lifecycle.
    Loan,
    /// Collections and repayments.
    Collection,
    /// Risk and compliance alerts.
    RiskCompliance,
    /// Support tickets.
    Support,
}

impl EventName {
    /// The full catalog in wire order.
    pub const ALL: [Self; 21] = [
        Self::Connect,
        Self::Disconnect,
        Self::Error,
        Self::Auth,
        Self::AuthSuccess,
        Self::AuthError,
        Self::Notification,
        Self::DashboardUpdate,
        Self::MetricsUpdate,
        Self::PerformanceUpdate,
        Self::ApplicationReceived,
        Self::ApplicationUpdated,
        Self::LoanStatusChange,
        Self::LoanApproved,
        Self::LoanRejected,
        Self::CollectionAlert,
        Self::PaymentReceived,
        Self::ComplianceAlert,
        Self::RiskAlert,
        Self::TicketAssigned,
        Self::TicketUpdated,
    ];

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
            Self::Error => "error",
            Self::Auth => "auth",
            Self::AuthSuccess => "auth:success",
            Self::AuthError => "auth:error",
            Self::Notification => "notification",
            Self::DashboardUpdate => "dashboard:update",
            Self::MetricsUpdate => "metrics:update",
            Self::PerformanceUpdate => "performance:update",
            Self::ApplicationReceived => "application:received",
            Self::ApplicationUpdated => "application:updated",
            Self::LoanStatusChange => "loan:status:change",
            Self::LoanApproved => "loan:approved",
            Self::LoanRejected => "loan:rejected",
            Self::CollectionAlert => "collection:alert",
            Self::PaymentReceived => "payment:received",
            Self::ComplianceAlert => "compliance:alert",
            Self::RiskAlert => "risk:alert",
            Self::TicketAssigned => "ticket:assigned",
            Self::TicketUpdated => "ticket:updated",
        }
    }

    /// Returns the category the event belongs to.
    #[must_use]
    pub const fn category(&self) -> EventCategory {
        match self {
            Self::Connect | Self::Disconnect | Self::Error => EventCategory::Connection,
            Self::Auth | Self::AuthSuccess | Self::AuthError => EventCategory::Authentication,
            Self::Notification => EventCategory::Notification,
            Self::DashboardUpdate | Self::MetricsUpdate | Self::PerformanceUpdate => {
                EventCategory::Dashboard
            }
            Self::ApplicationReceived | Self::ApplicationUpdated => EventCategory::Application,
            Self::LoanStatusChange | Self::LoanApproved | Self::LoanRejected => {
                EventCategory::Loan
            }
            Self::CollectionAlert | Self::PaymentReceived => EventCategory::Collection,
            Self::ComplianceAlert | Self::RiskAlert => EventCategory::RiskCompliance,
            Self::TicketAssigned | Self::TicketUpdated => EventCategory::Support,
        }
    }

    /// Returns `true` for events that only the transport or the handshake
    /// may emit. Application producers publish domain events only.
    #[must_use]
    pub const fn is_reserved(&self) -> bool {
        matches!(
            self.category(),
            EventCategory::Connection | EventCategory::Authentication
        )
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for a name outside the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event: {0}")]
pub struct UnknownEvent(pub String);

impl FromStr for EventName {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| UnknownEvent(s.to_string()))
    }
}
