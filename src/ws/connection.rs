//! WebSocket connection loop.
//!
//! Handles the read/write loop for a single WebSocket connection: answers
//! the `auth` handshake and forwards bus envelopes addressed to the
//! connection.
//!
//! The `auth` handshake trusts the `userId` the client sends. Nothing here
//! checks it against a session, so addressed envelopes are routed, not
//! confidential: any client may claim any id. Put a verifying auth
//! collaborator in front of `/ws` before addressing sensitive payloads.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{Sink, SinkExt, StreamExt};
use tokio::sync::broadcast;

use crate::domain::EventSubscription;
use crate::realtime::{EventName, WsMessage};

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Greets the client with `connect`.
/// - Reads envelopes from the client and answers `auth`.
/// - Forwards the envelopes the [`EventSubscription`] accepts.
pub async fn run_connection(socket: WebSocket, mut subscription: EventSubscription) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let hello = WsMessage::new(EventName::Connect, serde_json::json!({}));
    if send(&mut ws_tx, &hello).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            // Incoming frame from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = handle_text_message(text.as_str(), &mut subscription)
                            && send(&mut ws_tx, &reply).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            // Envelope from EventBus
            event = subscription.recv() => {
                match event {
                    Ok(message) => {
                        if send(&mut ws_tx, &message).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!(user_id = ?subscription.user_id(), "ws connection closed");
}

async fn send<S>(ws_tx: &mut S, message: &WsMessage) -> Result<(), ()>
where
    S: Sink<Message> + Unpin,
{
    let json = message.encode().map_err(|e| {
        tracing::warn!(event = %message.event, error = %e, "failed to encode envelope");
    })?;
    ws_tx.send(Message::text(json)).await.map_err(|_| ())
}

/// Handles a text frame from the client, returning an optional reply.
fn handle_text_message(text: &str, subs: &mut EventSubscription) -> Option<WsMessage> {
    let message = match WsMessage::decode(text) {
        Ok(Some(message)) => message,
        // Event outside the catalog: no-op.
        Ok(None) => return None,
        Err(_) => {
            return Some(WsMessage::new(
                EventName::Error,
                serde_json::json!({ "message": "malformed JSON" }),
            ));
        }
    };

    match message.event {
        EventName::Auth => Some(handle_auth(&message, subs)),
        other => {
            tracing::debug!(event = %other, "ignoring client event");
            None
        }
    }
}

/// Binds the connection to the claimed `userId`. The id is taken at face
/// value; see the module docs.
fn handle_auth(message: &WsMessage, subs: &mut EventSubscription) -> WsMessage {
    let user_id = message
        .data
        .get("userId")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .or(message.user_id.as_deref());

    let Some(user_id) = user_id else {
        return WsMessage::new(
            EventName::AuthError,
            serde_json::json!({ "message": "userId is required" }),
        );
    };

    subs.bind(user_id);
    tracing::info!(user_id, "ws client authenticated");

    WsMessage::new(
        EventName::AuthSuccess,
        serde_json::json!({ "userId": user_id }),
    )
    .for_user(user_id)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::EventBus;

    fn subscription() -> EventSubscription {
        EventBus::new(8).subscribe()
    }

    #[test]
    fn auth_binds_user() {
        let mut subs = subscription();
        let Some(reply) = handle_text_message(
            r#"{"event":"auth","data":{"userId":"u-7","role":"UNDERWRITER"}}"#,
            &mut subs,
        ) else {
            panic!("expected auth reply");
        };
        assert_eq!(reply.event, EventName::AuthSuccess);
        assert_eq!(reply.data["userId"], "u-7");
        assert_eq!(subs.user_id(), Some("u-7"));
    }

    #[test]
    fn auth_accepts_envelope_user_id() {
        let mut subs = subscription();
        let reply = handle_text_message(r#"{"event":"auth","userId":"u-8"}"#, &mut subs);
        assert_eq!(reply.map(|r| r.event), Some(EventName::AuthSuccess));
        assert_eq!(subs.user_id(), Some("u-8"));
    }

    #[test]
    fn auth_without_user_is_rejected() {
        let mut subs = subscription();
        let reply = handle_text_message(r#"{"event":"auth","data":{}}"#, &mut subs);
        assert_eq!(reply.map(|r| r.event), Some(EventName::AuthError));
        assert_eq!(subs.user_id(), None);
    }

    #[test]
    fn unknown_event_is_ignored_without_state_change() {
        let mut subs = subscription();
        let reply = handle_text_message(
            r#"{"event":"loan:disbursed","data":{"userId":"x"}}"#,
            &mut subs,
        );
        assert!(reply.is_none());
        assert_eq!(subs.user_id(), None);
    }

    #[test]
    fn malformed_json_yields_error_event() {
        let mut subs = subscription();
        let reply = handle_text_message("{oops", &mut subs);
        assert_eq!(reply.map(|r| r.event), Some(EventName::Error));
    }

    #[test]
    fn other_catalog_events_are_ignored() {
        let mut subs = subscription();
        let reply = handle_text_message(r#"{"event":"notification","data":{}}"#, &mut subs);
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn auth_trusts_the_claimed_user_id() {
        let bus = EventBus::new(8);
        let mut subs = bus.subscribe();
        let frame = r#"{"event":"auth","data":{"userId":"victim"}}"#;
        let reply = handle_text_message(frame, &mut subs);
        assert_eq!(reply.map(|r| r.event), Some(EventName::AuthSuccess));

        let secret = WsMessage::new(EventName::PaymentReceived, serde_json::json!({}));
        assert_eq!(bus.publish(secret.for_user("victim")), 1);
        let Ok(received) = subs.recv().await else {
            panic!("addressed envelope not delivered");
        };
        assert_eq!(received.user_id.as_deref(), Some("victim"));
    }
}
