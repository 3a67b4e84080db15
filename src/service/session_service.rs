//! Session service: opens routing sessions and evaluates them.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{AuthUser, RouterView, SessionId, SessionRegistry};
use crate::error::GatewayError;

/// Orchestration layer for role routing sessions.
///
/// Owns the [`SessionRegistry`]. Each evaluation takes the session's
/// write lock so concurrent evaluations of one session cannot both issue
/// the navigation.
#[derive(Debug, Clone)]
pub struct SessionService {
    registry: Arc<SessionRegistry>,
}

impl SessionService {
    /// Creates a new `SessionService`.
    #[must_use]
    pub const fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    /// Returns a reference to the inner [`SessionRegistry`].
    #[must_use]
    pub const fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Opens a session in the loading phase.
    pub async fn open(&self) -> SessionId {
        let id = self.registry.open().await;
        tracing::info!(session_id = %id, "routing session opened");
        id
    }

    /// Evaluates `(user, is_loading)` for a session.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::SessionNotFound`] if the session is not open.
    pub async fn route(
        &self,
        id: SessionId,
        user: Option<&AuthUser>,
        is_loading: bool,
    ) -> Result<RouterView, GatewayError> {
        let router = self.registry.get(id).await?;
        let mut router = router.write().await;
        let view = router.evaluate(user, is_loading);
        if let RouterView::Navigate(destination) = view {
            tracing::info!(
                session_id = %id,
                %destination,
                role = ?user.and_then(|u| u.role),
                "session navigated"
            );
        }
        Ok(view)
    }

    /// Closes a session.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::SessionNotFound`] if the session is not open.
    pub async fn close(&self, id: SessionId) -> Result<(), GatewayError> {
        self.registry.close(id).await?;
        tracing::info!(session_id = %id, "routing session closed");
        Ok(())
    }

    /// Drops sessions that have been idle past the registry's timeout.
    pub async fn sweep_idle(&self) -> usize {
        let expired = self.registry.evict_idle().await;
        if expired > 0 {
            let remaining = self.registry.len().await;
            tracing::info!(expired, remaining, "expired idle sessions");
        }
        expired
    }

    /// Spawns a background task that calls [`Self::sweep_idle`] every
    /// `period`.
    pub fn spawn_sweeper(self: Arc<Self>, period: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let _ = self.sweep_idle().await;
            }
        })
    }
}
