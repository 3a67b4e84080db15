//! Bounded reconnection state machine.
//!
//! [`Reconnector`] decides, after each lost or failed connection, whether
//! to try again and how long to wait. Attempts are sequential. Once the
//! attempt budget is spent the decision is [`ReconnectDecision::GiveUp`]
//! forever; callers surface that as [`ConnectionStatus::Disconnected`].

use std::time::Duration;

use serde::Serialize;

use super::ConnectionPolicy;

/// Why a channel ended up disconnected for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisconnectReason {
    /// The owner closed the channel.
    ClientClosed,
    /// The policy disables automatic reconnection.
    ReconnectionDisabled,
    /// Every reconnection attempt failed.
    AttemptsExhausted {
        /// Attempts that were made.
        attempts: u32,
    },
}

/// Observable state of a realtime channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// First connection in progress.
    Connecting,
    /// Connected and exchanging envelopes.
    Connected,
    /// Waiting before reconnection attempt `attempt`.
    Reconnecting {
        /// 1-based attempt number.
        attempt: u32,
        /// Backoff before the attempt, in milliseconds.
        delay_ms: u64,
    },
    /// Terminal. No further attempts will be made.
    Disconnected {
        /// Why the channel stopped.
        reason: DisconnectReason,
    },
}

impl ConnectionStatus {
    /// Returns `true` for the terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Disconnected { .. })
    }
}

/// Outcome of [`Reconnector::on_connection_lost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDecision {
    /// Wait `delay`, then make attempt number `attempt`.
    Retry {
        /// 1-based attempt number.
        attempt: u32,
        /// Backoff to wait first.
        delay: Duration,
    },
    /// Stop. The reason is terminal.
    GiveUp(DisconnectReason),
}

/// Tracks reconnection attempts against a [`ConnectionPolicy`].
#[derive(Debug, Clone)]
pub struct Reconnector {
    policy: ConnectionPolicy,
    attempts: u32,
    given_up: Option<DisconnectReason>,
}

impl Reconnector {
    /// Creates a reconnector with no attempts made.
    #[must_use]
    pub const fn new(policy: ConnectionPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
            given_up: None,
        }
    }

    /// The policy in force.
    #[must_use]
    pub const fn policy(&self) -> &ConnectionPolicy {
        &self.policy
    }

    /// Attempts made since the last successful connection.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// A connection was established: the attempt budget starts over.
    ///
    /// Has no effect after giving up.
    pub fn on_connected(&mut self) {
        if self.given_up.is_none() {
            self.attempts = 0;
        }
    }

    /// A connection attempt failed or an established connection dropped.
    pub fn on_connection_lost(&mut self) -> ReconnectDecision {
        if let Some(reason) = self.given_up {
            return ReconnectDecision::GiveUp(reason);
        }
        if !self.policy.reconnection {
            return self.give_up(DisconnectReason::ReconnectionDisabled);
        }
        if self.attempts >= self.policy.reconnection_attempts {
            return self.give_up(DisconnectReason::AttemptsExhausted {
                attempts: self.attempts,
            });
        }
        self.attempts = self.attempts.saturating_add(1);
        ReconnectDecision::Retry {
            attempt: self.attempts,
            delay: self.policy.delay_for_attempt(self.attempts),
        }
    }

    fn give_up(&mut self, reason: DisconnectReason) -> ReconnectDecision {
        tracing::warn!(?reason, attempts = self.attempts, "realtime channel giving up");
        self.given_up = Some(reason);
        ReconnectDecision::GiveUp(reason)
    }
}
