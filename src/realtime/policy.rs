//! Default connection policy for the realtime channel.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Transport kinds a client may use, in preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Persistent WebSocket.
    Websocket,
    /// HTTP long-polling fallback.
    Polling,
}

/// Reconnection and timeout settings shared by every realtime client.
///
/// All durations are milliseconds on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionPolicy {
    /// Whether to reconnect automatically after the connection drops.
    pub reconnection: bool,
    /// Delay before the first reconnection attempt.
    pub reconnection_delay: u64,
    /// Upper bound for the backoff delay.
    pub reconnection_delay_max: u64,
    /// Attempts before giving up for good.
    pub reconnection_attempts: u32,
    /// Connection establishment timeout.
    pub timeout: u64,
    /// Acceptable transports, most preferred first.
    pub transports: Vec<TransportKind>,
}

impl ConnectionPolicy {
    /// Backoff delay before attempt `attempt` (1-based): the initial delay
    /// doubled per previous attempt, capped at the maximum.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let factor = 1u64 << exponent;
        let ms = self
            .reconnection_delay
            .saturating_mul(factor)
            .min(self.reconnection_delay_max.max(self.reconnection_delay));
        Duration::from_millis(ms)
    }

    /// Connection establishment timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }

    /// Most preferred transport, if any is configured.
    #[must_use]
    pub fn preferred_transport(&self) -> Option<TransportKind> {
        self.transports.first().copied()
    }
}

impl Default for ConnectionPolicy {
    fn default() -> Self {
        Self {
            reconnection: true,
            reconnection_delay: 1_000,
            reconnection_delay_max: 5_000,
            reconnection_attempts: 5,
            timeout: 10_000,
            transports: vec![TransportKind::Websocket, TransportKind::Polling],
        }
    }
}
