//! Realtime client honouring the connection policy.
//!
//! [`RealtimeClient::spawn`] starts a background task that owns the single
//! WebSocket connection for the session. Inbound envelopes are fanned out
//! on a broadcast channel, outbound envelopes are queued on an mpsc
//! channel, and [`ConnectionStatus`] is published through a watch channel.
//! When the reconnection budget runs out the status becomes
//! [`ConnectionStatus::Disconnected`] and the task ends.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::reconnect::{ConnectionStatus, DisconnectReason, ReconnectDecision, Reconnector};
use super::{ConnectionPolicy, EventName, TransportKind, WsMessage};

const OUTBOUND_CAPACITY: usize = 256;
const INBOUND_CAPACITY: usize = 1_024;

/// Client-side realtime errors.
#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    /// The background task has stopped; the channel is terminal.
    #[error("realtime channel closed")]
    ChannelClosed,

    /// The policy lists no transport this client can speak.
    #[error("no supported transport in policy")]
    NoSupportedTransport,
}

/// Handle to a running realtime connection.
#[derive(Debug)]
pub struct RealtimeClient {
    outbound: mpsc::Sender<WsMessage>,
    inbound: broadcast::Sender<WsMessage>,
    status: watch::Receiver<ConnectionStatus>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl RealtimeClient {
    /// Starts connecting to `url` in the background.
    ///
    /// Only the WebSocket transport is implemented; a policy that does not
    /// list it is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::NoSupportedTransport`] if the policy does
    /// not allow WebSocket.
    pub fn spawn(url: impl Into<String>, policy: ConnectionPolicy) -> Result<Self, RealtimeError> {
        if !policy.transports.contains(&TransportKind::Websocket) {
            return Err(RealtimeError::NoSupportedTransport);
        }
        let url = url.into();
        let (outbound, outbound_rx) = mpsc::channel(OUTBOUND_CAPACITY);
        let (inbound, _) = broadcast::channel(INBOUND_CAPACITY);
        let (status_tx, status) = watch::channel(ConnectionStatus::Connecting);
        let (shutdown, shutdown_rx) = watch::channel(false);

        let worker = Worker {
            url,
            reconnector: Reconnector::new(policy),
            outbound_rx,
            inbound: inbound.clone(),
            status: status_tx,
            shutdown: shutdown_rx,
        };
        let task = tokio::spawn(worker.run());

        Ok(Self {
            outbound,
            inbound,
            status,
            shutdown,
            task,
        })
    }

    /// Watches the connection status.
    #[must_use]
    pub fn status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    /// Receives every inbound envelope whose event is in the catalog.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<WsMessage> {
        self.inbound.subscribe()
    }

    /// Queues an envelope for sending. Envelopes queued while
    /// reconnecting are sent once the connection is back.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::ChannelClosed`] once the channel is
    /// terminal.
    pub async fn send(&self, message: WsMessage) -> Result<(), RealtimeError> {
        self.outbound
            .send(message)
            .await
            .map_err(|_| RealtimeError::ChannelClosed)
    }

    /// Sends the `auth` handshake for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::ChannelClosed`] once the channel is
    /// terminal.
    pub async fn authenticate(&self, user_id: &str) -> Result<(), RealtimeError> {
        self.send(WsMessage::new(
            EventName::Auth,
            serde_json::json!({ "userId": user_id }),
        ))
        .await
    }

    /// Waits until the channel reaches its terminal state.
    pub async fn terminated(&self) -> ConnectionStatus {
        let mut status = self.status.clone();
        match status.wait_for(ConnectionStatus::is_terminal).await {
            Ok(s) => *s,
            Err(_) => ConnectionStatus::Disconnected {
                reason: DisconnectReason::ClientClosed,
            },
        }
    }

    /// Closes the connection and waits for the background task to end.
    pub async fn close(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "realtime task ended abnormally");
        }
    }
}

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How a connected session ended.
enum SessionEnd {
    Lost,
    Closed,
}

struct Worker {
    url: String,
    reconnector: Reconnector,
    outbound_rx: mpsc::Receiver<WsMessage>,
    inbound: broadcast::Sender<WsMessage>,
    status: watch::Sender<ConnectionStatus>,
    shutdown: watch::Receiver<bool>,
}

impl Worker {
    async fn run(mut self) {
        loop {
            let timeout = self.reconnector.policy().connect_timeout();
            let connect = tokio_tungstenite::connect_async(self.url.as_str());
            let connected = tokio::select! {
                res = tokio::time::timeout(timeout, connect) => res,
                _ = self.shutdown.changed() => {
                    return self.finish(DisconnectReason::ClientClosed);
                }
            };

            match connected {
                Ok(Ok((socket, _))) => {
                    self.reconnector.on_connected();
                    self.status.send_replace(ConnectionStatus::Connected);
                    tracing::info!(url = %self.url, "realtime connected");
                    if let SessionEnd::Closed = self.drive(socket).await {
                        return self.finish(DisconnectReason::ClientClosed);
                    }
                    tracing::warn!(url = %self.url, "realtime connection lost");
                }
                Ok(Err(e)) => {
                    tracing::warn!(url = %self.url, error = %e, "realtime connect failed");
                }
                Err(_) => {
                    tracing::warn!(url = %self.url, ?timeout, "realtime connect timed out");
                }
            }

            match self.reconnector.on_connection_lost() {
                ReconnectDecision::Retry { attempt, delay } => {
                    let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
                    self.status
                        .send_replace(ConnectionStatus::Reconnecting { attempt, delay_ms });
                    tokio::select! {
                        () = tokio::time::sleep(delay) => {}
                        _ = self.shutdown.changed() => {
                            return self.finish(DisconnectReason::ClientClosed);
                        }
                    }
                }
                ReconnectDecision::GiveUp(reason) => return self.finish(reason),
            }
        }
    }

    async fn drive(&mut self, socket: Socket) -> SessionEnd {
        let (mut tx, mut rx) = socket.split();
        loop {
            tokio::select! {
                frame = rx.next() => match frame {
                    Some(Ok(Message::Text(text))) => self.deliver(text.as_str()),
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return SessionEnd::Lost,
                    Some(Ok(_)) => {}
                },
                out = self.outbound_rx.recv() => {
                    let Some(message) = out else {
                        let _ = tx.send(Message::Close(None)).await;
                        return SessionEnd::Closed;
                    };
                    match message.encode() {
                        Ok(json) => {
                            if tx.send(Message::text(json)).await.is_err() {
                                return SessionEnd::Lost;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(event = %message.event, error = %e, "dropping envelope");
                        }
                    }
                }
                _ = self.shutdown.changed() => {
                    let _ = tx.send(Message::Close(None)).await;
                    return SessionEnd::Closed;
                }
            }
        }
    }

    fn deliver(&self, text: &str) {
        match WsMessage::decode(text) {
            Ok(Some(message)) => {
                let _ = self.inbound.send(message);
            }
            Ok(None) => {}
            Err(e) => tracing::debug!(error = %e, "ignoring malformed frame"),
        }
    }

    fn finish(&mut self, reason: DisconnectReason) {
        self.outbound_rx.close();
        tracing::info!(url = %self.url, ?reason, "realtime channel disconnected");
        self.status
            .send_replace(ConnectionStatus::Disconnected { reason });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_policy(attempts: u32) -> ConnectionPolicy {
        ConnectionPolicy {
            reconnection_delay: 5,
            reconnection_delay_max: 10,
            reconnection_attempts: attempts,
            timeout: 200,
            ..ConnectionPolicy::default()
        }
    }

    async fn closed_port() -> u16 {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await;
        let Ok(listener) = listener else {
            return 9;
        };
        listener.local_addr().map(|a| a.port()).unwrap_or(9)
    }

    #[test]
    fn polling_only_policy_is_rejected() {
        let policy = ConnectionPolicy {
            transports: vec![TransportKind::Polling],
            ..ConnectionPolicy::default()
        };
        assert!(matches!(
            RealtimeClient::spawn("ws://127.0.0.1:9/ws", policy),
            Err(RealtimeError::NoSupportedTransport)
        ));
    }

    #[tokio::test]
    async fn exhausting_attempts_is_terminal_and_observable() {
        let port = closed_port().await;
        let Ok(client) = RealtimeClient::spawn(format!("ws://127.0.0.1:{port}/ws"), fast_policy(3))
        else {
            return;
        };
        let status = client.terminated().await;
        assert_eq!(
            status,
            ConnectionStatus::Disconnected {
                reason: DisconnectReason::AttemptsExhausted { attempts: 3 }
            }
        );
        assert!(matches!(
            client.send(WsMessage::new(EventName::Notification, serde_json::Value::Null)).await,
            Err(RealtimeError::ChannelClosed)
        ));
    }

    #[tokio::test]
    async fn close_while_reconnecting_ends_task() {
        let port = closed_port().await;
        let policy = ConnectionPolicy {
            reconnection_delay: 60_000,
            reconnection_delay_max: 60_000,
            ..fast_policy(5)
        };
        let Ok(client) = RealtimeClient::spawn(format!("ws://127.0.0.1:{port}/ws"), policy) else {
            return;
        };
        let mut status = client.status();
        let _ = status
            .wait_for(|s| matches!(s, ConnectionStatus::Reconnecting { .. }))
            .await;
        let watcher = client.status();
        client.close().await;
        assert_eq!(
            *watcher.borrow(),
            ConnectionStatus::Disconnected {
                reason: DisconnectReason::ClientClosed
            }
        );
    }
}
