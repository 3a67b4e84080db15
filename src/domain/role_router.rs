//! Session role router.
//!
//! [`RoleRouter`] turns the `(user, is_loading)` pair reported by the auth
//! collaborator into at most one navigation per settled state.
//!
//! ```text
//! Loading ──settle──▶ Resolved(dest) ──navigate──▶ Navigated(dest)
//! ```
//!
//! `Navigated` is terminal for a given settled state. A later settled input
//! that resolves differently (different user or destination) navigates once
//! more; re-evaluating the same input never does.

use super::{AuthUser, Destination};

/// Navigation collaborator: performs the transition to a destination.
pub trait Navigator {
    /// Navigates to `destination`.
    fn navigate(&mut self, destination: Destination);
}

/// Router lifecycle phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterPhase {
    /// Session state not yet known.
    Loading,
    /// Destination computed, navigation not yet issued.
    ///
    /// Transient: [`RoleRouter::evaluate`] moves on to
    /// [`RouterPhase::Navigated`] before returning, so callers never observe
    /// it through [`RoleRouter::phase`].
    Resolved(Destination),
    /// Navigation issued for the given settled state.
    Navigated {
        /// Where the session was sent.
        destination: Destination,
        /// Identity of the user the decision was made for.
        user_id: Option<String>,
    },
}

/// What the caller should present after an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterView {
    /// Indeterminate loading indication. No navigation happened.
    Loading,
    /// Navigation was issued by this evaluation.
    Navigate(Destination),
    /// Navigation for this state was already issued earlier.
    Navigated(Destination),
}

/// Role-based landing router for a single session.
#[derive(Debug)]
pub struct RoleRouter<N> {
    navigator: N,
    phase: RouterPhase,
}

impl<N: Navigator> RoleRouter<N> {
    /// Creates a router in the [`RouterPhase::Loading`] phase.
    #[must_use]
    pub const fn new(navigator: N) -> Self {
        Self {
            navigator,
            phase: RouterPhase::Loading,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> &RouterPhase {
        &self.phase
    }

    /// Returns the navigation collaborator.
    #[must_use]
    pub const fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Evaluates the current auth state.
    ///
    /// While `is_loading` is set nothing is decided. Once navigated, a
    /// loading flicker keeps the previous decision instead of falling back
    /// to [`RouterPhase::Loading`].
    pub fn evaluate(&mut self, user: Option<&AuthUser>, is_loading: bool) -> RouterView {
        if is_loading {
            return match &self.phase {
                RouterPhase::Navigated { destination, .. } => RouterView::Navigated(*destination),
                _ => RouterView::Loading,
            };
        }

        let destination = Destination::for_role(user.and_then(|u| u.role));
        let user_id = user.map(|u| u.id.clone());

        if let RouterPhase::Navigated {
            destination: previous,
            user_id: previous_user,
        } = &self.phase
            && *previous == destination
            && *previous_user == user_id
        {
            return RouterView::Navigated(destination);
        }

        self.phase = RouterPhase::Resolved(destination);
        tracing::debug!(%destination, user_id = ?user_id, "route resolved");

        self.navigator.navigate(destination);
        self.phase = RouterPhase::Navigated {
            destination,
            user_id,
        };
        RouterView::Navigate(destination)
    }
}

/// Navigator that records the most recent redirect and counts how many
/// were issued. Used by the HTTP session endpoints, where the redirect is
/// handed back to the browser rather than performed in-process.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RedirectRecorder {
    last: Option<Destination>,
    count: u64,
}

impl RedirectRecorder {
    /// Creates a recorder with no redirects.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently issued destination.
    #[must_use]
    pub const fn last(&self) -> Option<Destination> {
        self.last
    }

    /// Number of navigations issued so far.
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }
}

impl Navigator for RedirectRecorder {
    fn navigate(&mut self, destination: Destination) {
        self.last = Some(destination);
        self.count = self.count.saturating_add(1);
    }
}
