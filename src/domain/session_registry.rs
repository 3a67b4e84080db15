//! Concurrent store of routing sessions with per-session locking.
//!
//! [`SessionRegistry`] keeps one [`RoleRouter`] per open session in a
//! `HashMap` where each router is individually protected by a
//! [`tokio::sync::RwLock`]. The map lock is only held to look up or touch
//! an entry; evaluations of the same session are serialized on the
//! router's own lock, which is what keeps navigation single-shot per
//! settled state.
//!
//! Sessions that are never closed expire: every [`SessionRegistry::open`]
//! first drops sessions idle for longer than the configured timeout, and
//! when the registry is still at capacity the least recently used session
//! is evicted to make room.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use super::{RedirectRecorder, RoleRouter, SessionId};
use crate::error::GatewayError;

/// Router type held for each session.
pub type SessionRouter = RoleRouter<RedirectRecorder>;

/// Default idle time after which a session is dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Default upper bound on simultaneously open sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 100_000;

#[derive(Debug)]
struct SessionEntry {
    router: Arc<RwLock<SessionRouter>>,
    last_touched: Instant,
}

/// Central store for all open routing sessions.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, SessionEntry>>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl SessionRegistry {
    /// Creates an empty registry with the default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_SESSIONS)
    }

    /// Creates an empty registry that expires sessions idle for longer than
    /// `idle_timeout` and holds at most `max_sessions` (at least one).
    #[must_use]
    pub fn with_limits(idle_timeout: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Opens a new session with a fresh router in the loading phase.
    pub async fn open(&self) -> SessionId {
        let id = SessionId::new();
        let router = RoleRouter::new(RedirectRecorder::new());
        let now = Instant::now();

        let mut map = self.sessions.write().await;
        let expired = Self::evict_idle_locked(&mut map, now, self.idle_timeout);
        if expired > 0 {
            tracing::debug!(expired, "expired idle routing sessions");
        }
        while map.len() >= self.max_sessions {
            let oldest = map
                .iter()
                .min_by_key(|(_, entry)| entry.last_touched)
                .map(|(id, _)| *id);
            let Some(oldest) = oldest else { break };
            map.remove(&oldest);
            tracing::warn!(session_id = %oldest, "session limit reached, evicted oldest session");
        }

        map.insert(
            id,
            SessionEntry {
                router: Arc::new(RwLock::new(router)),
                last_touched: now,
            },
        );
        id
    }

    /// Returns the router for a session behind its own lock and marks the
    /// session as used.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::SessionNotFound`] if the session is not open
    /// or has expired.
    pub async fn get(&self, id: SessionId) -> Result<Arc<RwLock<SessionRouter>>, GatewayError> {
        let now = Instant::now();
        let mut map = self.sessions.write().await;
        let expired = map
            .get(&id)
            .is_some_and(|entry| now.duration_since(entry.last_touched) > self.idle_timeout);
        if expired {
            map.remove(&id);
        }
        let entry = map
            .get_mut(&id)
            .ok_or(GatewayError::SessionNotFound(*id.as_uuid()))?;
        entry.last_touched = now;
        Ok(Arc::clone(&entry.router))
    }

    /// Closes a session.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::SessionNotFound`] if the session is not open.
    pub async fn close(&self, id: SessionId) -> Result<(), GatewayError> {
        let mut map = self.sessions.write().await;
        map.remove(&id)
            .map(|_| ())
            .ok_or(GatewayError::SessionNotFound(*id.as_uuid()))
    }

    /// Drops every session idle for longer than the idle timeout and
    /// returns how many were removed.
    pub async fn evict_idle(&self) -> usize {
        let mut map = self.sessions.write().await;
        Self::evict_idle_locked(&mut map, Instant::now(), self.idle_timeout)
    }

    /// Returns the number of open sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Returns `true` if no session is open.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    fn evict_idle_locked(
        map: &mut HashMap<SessionId, SessionEntry>,
        now: Instant,
        idle_timeout: Duration,
    ) -> usize {
        let before = map.len();
        map.retain(|_, entry| now.duration_since(entry.last_touched) <= idle_timeout);
        before.saturating_sub(map.len())
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RouterPhase;

    #[tokio::test]
    async fn open_and_get() {
        let registry = SessionRegistry::new();
        let id = registry.open().await;

        let router = registry.get(id).await;
        assert!(router.is_ok());
        if let Ok(router) = router {
            assert_eq!(*router.read().await.phase(), RouterPhase::Loading);
        }
    }

    #[tokio::test]
    async fn get_unknown_session_fails() {
        let registry = SessionRegistry::new();
        assert!(registry.get(SessionId::new()).await.is_err());
    }

    #[tokio::test]
    async fn close_removes_session() {
        let registry = SessionRegistry::new();
        let id = registry.open().await;
        tokio_test::assert_ok!(registry.close(id).await);
        tokio_test::assert_err!(registry.get(id).await);
        tokio_test::assert_err!(registry.close(id).await);
    }

    #[tokio::test]
    async fn len_and_is_empty() {
        let registry = SessionRegistry::new();
        assert!(registry.is_empty().await);
        let _ = registry.open().await;
        let _ = registry.open().await;
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_sessions_expire() {
        let registry = SessionRegistry::with_limits(Duration::from_secs(60), 100);
        let idle = registry.open().await;
        let active = registry.open().await;

        tokio::time::advance(Duration::from_secs(45)).await;
        tokio_test::assert_ok!(registry.get(active).await);

        tokio::time::advance(Duration::from_secs(30)).await;
        tokio_test::assert_err!(registry.get(idle).await);
        tokio_test::assert_ok!(registry.get(active).await);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn open_sweeps_idle_sessions() {
        let registry = SessionRegistry::with_limits(Duration::from_secs(60), 100);
        for _ in 0..10 {
            let _ = registry.open().await;
        }
        tokio::time::advance(Duration::from_secs(61)).await;

        let fresh = registry.open().await;
        assert_eq!(registry.len().await, 1);
        tokio_test::assert_ok!(registry.get(fresh).await);
    }

    #[tokio::test(start_paused = true)]
    async fn full_registry_evicts_least_recently_used() {
        let registry = SessionRegistry::with_limits(Duration::from_secs(600), 2);
        let first = registry.open().await;
        tokio::time::advance(Duration::from_secs(1)).await;
        let second = registry.open().await;
        tokio::time::advance(Duration::from_secs(1)).await;
        // Touching the first session makes the second the oldest.
        tokio_test::assert_ok!(registry.get(first).await);
        tokio::time::advance(Duration::from_secs(1)).await;

        let third = registry.open().await;
        assert_eq!(registry.len().await, 2);
        tokio_test::assert_err!(registry.get(second).await);
        tokio_test::assert_ok!(registry.get(first).await);
        tokio_test::assert_ok!(registry.get(third).await);
    }

    #[tokio::test(start_paused = true)]
    async fn evict_idle_reports_removed_count() {
        let registry = SessionRegistry::with_limits(Duration::from_secs(5), 100);
        let _ = registry.open().await;
        let _ = registry.open().await;
        assert_eq!(registry.evict_idle().await, 0);
        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(registry.evict_idle().await, 2);
        assert!(registry.is_empty().await);
    }
}
