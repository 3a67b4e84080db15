//! Recipient-aware fan-out of realtime envelopes.
//!
//! [`EventBus`] carries every [`WsMessage`] over one
//! [`tokio::sync::broadcast`] channel and keeps a count of live
//! connections per bound user id. Each connection holds an
//! [`EventSubscription`]; binding it to a user makes addressed envelopes
//! for that user visible, and dropping it releases the binding.
//!
//! Delivery rule: an envelope without `userId` reaches every subscription,
//! an addressed one only the subscriptions bound to that id.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use crate::realtime::WsMessage;

type Bindings = Arc<Mutex<HashMap<String, usize>>>;

fn lock(bindings: &Bindings) -> MutexGuard<'_, HashMap<String, usize>> {
    bindings.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fan-out bus for [`WsMessage`]s.
///
/// Backed by a `tokio::broadcast` channel with a configurable capacity
/// (default 10 000). When the ring buffer is full, the oldest messages are
/// dropped for lagging subscriptions.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<WsMessage>,
    bindings: Bindings,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            bindings: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Publishes an envelope.
    ///
    /// Returns the number of subscriptions it is addressed to: all of them
    /// for a broadcast, the ones bound to the recipient otherwise.
    pub fn publish(&self, message: WsMessage) -> usize {
        let recipients = match message.user_id.as_deref() {
            None => self.sender.receiver_count(),
            Some(user_id) => self.bound_connections(user_id),
        };
        if recipients == 0 {
            return 0;
        }
        self.sender.send(message).map_or(0, |_| recipients)
    }

    /// Opens an unbound subscription for all future envelopes.
    #[must_use]
    pub fn subscribe(&self) -> EventSubscription {
        EventSubscription {
            receiver: self.sender.subscribe(),
            user_id: None,
            bindings: Arc::clone(&self.bindings),
        }
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Returns how many live subscriptions are bound to `user_id`.
    #[must_use]
    pub fn bound_connections(&self, user_id: &str) -> usize {
        lock(&self.bindings).get(user_id).copied().unwrap_or(0)
    }
}

/// One connection's view of the [`EventBus`].
#[derive(Debug)]
pub struct EventSubscription {
    receiver: broadcast::Receiver<WsMessage>,
    user_id: Option<String>,
    bindings: Bindings,
}

impl EventSubscription {
    /// Binds the subscription to a user. A later bind replaces the
    /// previous one.
    pub fn bind(&mut self, user_id: impl Into<String>) {
        let user_id = user_id.into();
        let mut bindings = lock(&self.bindings);
        if let Some(previous) = self.user_id.take() {
            release(&mut bindings, &previous);
        }
        *bindings.entry(user_id.clone()).or_default() += 1;
        self.user_id = Some(user_id);
    }

    /// Returns the bound user id.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Returns `true` if the envelope is meant for this subscription.
    #[must_use]
    pub fn accepts(&self, message: &WsMessage) -> bool {
        match message.user_id.as_deref() {
            None => true,
            Some(recipient) => self.user_id.as_deref() == Some(recipient),
        }
    }

    /// Waits for the next envelope meant for this subscription, skipping
    /// ones addressed to other users. Cancel safe.
    ///
    /// # Errors
    ///
    /// Returns [`broadcast::error::RecvError::Lagged`] when envelopes were
    /// dropped for this subscription and
    /// [`broadcast::error::RecvError::Closed`] once the bus is gone.
    pub async fn recv(&mut self) -> Result<WsMessage, broadcast::error::RecvError> {
        loop {
            let message = self.receiver.recv().await?;
            if self.accepts(&message) {
                return Ok(message);
            }
        }
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        if let Some(user_id) = self.user_id.take() {
            release(&mut lock(&self.bindings), &user_id);
        }
    }
}

fn release(bindings: &mut HashMap<String, usize>, user_id: &str) {
    if let Some(count) = bindings.get_mut(user_id) {
        *count = count.saturating_sub(1);
        if *count == 0 {
            bindings.remove(user_id);
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::realtime::EventName;

    fn approved(loan: &str) -> WsMessage {
        WsMessage::new(EventName::LoanApproved, serde_json::json!({ "loanId": loan }))
    }

    #[test]
    fn nobody_listening_delivers_nothing() {
        let bus = EventBus::new(16);
        assert_eq!(bus.publish(approved("L-1")), 0);
    }

    #[tokio::test]
    async fn addressed_envelopes_skip_other_users() {
        let bus = EventBus::new(16);
        let mut alice = bus.subscribe();
        let mut bob = bus.subscribe();
        alice.bind("alice");
        bob.bind("bob");

        assert_eq!(bus.publish(approved("L-bob").for_user("bob")), 1);
        assert_eq!(bus.publish(approved("L-all")), 2);

        let Ok(first) = alice.recv().await else {
            panic!("alice got nothing");
        };
        assert_eq!(first.data["loanId"], "L-all");

        let Ok(first) = bob.recv().await else {
            panic!("bob got nothing");
        };
        assert_eq!(first.data["loanId"], "L-bob");
    }

    #[tokio::test]
    async fn unbound_subscription_sees_broadcasts_only() {
        let bus = EventBus::new(16);
        let mut anon = bus.subscribe();
        assert_eq!(bus.publish(approved("L-1").for_user("u-1")), 0);
        assert_eq!(bus.publish(approved("L-2")), 1);

        let Ok(message) = anon.recv().await else {
            panic!("no broadcast");
        };
        assert_eq!(message.data["loanId"], "L-2");
    }

    #[test]
    fn bindings_follow_rebind_and_drop() {
        let bus = EventBus::new(16);
        let mut tab_a = bus.subscribe();
        let mut tab_b = bus.subscribe();
        tab_a.bind("u-1");
        tab_b.bind("u-1");
        assert_eq!(bus.bound_connections("u-1"), 2);

        tab_b.bind("u-2");
        assert_eq!(bus.bound_connections("u-1"), 1);
        assert_eq!(bus.bound_connections("u-2"), 1);
        assert_eq!(tab_b.user_id(), Some("u-2"));

        drop(tab_a);
        drop(tab_b);
        assert_eq!(bus.bound_connections("u-1"), 0);
        assert_eq!(bus.bound_connections("u-2"), 0);
        assert_eq!(bus.receiver_count(), 0);
    }
}
