//! SessionStore — the only component allowed to move the process between
//! "logged out" and "logged in".
//!
//! Consumers react to user transitions by subscribing to the session
//! channel; the store itself knows nothing about credits or any other
//! downstream state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::watch;

use thumblab_core::models::UserIdentity;
use thumblab_core::traits::IApiTransport;

/// Current session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: Option<UserIdentity>,
    /// True only during the initial introspection fetch; once it resolves
    /// it never becomes true again for the lifetime of the process.
    pub is_bootstrapping: bool,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct CurrentUserPayload {
    user: Option<UserIdentity>,
}

/// Owns the authenticated-user identity and its lifecycle.
pub struct SessionStore {
    transport: Arc<dyn IApiTransport>,
    state: watch::Sender<Session>,
    bootstrapped: AtomicBool,
}

impl SessionStore {
    pub fn new(transport: Arc<dyn IApiTransport>) -> Self {
        let (state, _) = watch::channel(Session {
            user: None,
            is_bootstrapping: true,
        });
        Self {
            transport,
            state,
            bootstrapped: AtomicBool::new(false),
        }
    }

    /// Subscribe to session transitions.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Cloned snapshot of the current session.
    pub fn current(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn user(&self) -> Option<UserIdentity> {
        self.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_bootstrapping(&self) -> bool {
        self.state.borrow().is_bootstrapping
    }

    /// Resolve the session from the introspection endpoint.
    ///
    /// Runs at most once per process; later calls return immediately. Any
    /// failure — network or rejection — resolves to "no user". Either way
    /// `is_bootstrapping` flips to false exactly once.
    pub async fn bootstrap(&self) {
        if self.bootstrapped.swap(true, Ordering::SeqCst) {
            return;
        }

        let user = self.introspect().await;
        match &user {
            Some(identity) => {
                tracing::info!(username = %identity.username, "session: bootstrap resolved")
            }
            None => tracing::info!("session: bootstrap resolved without a user"),
        }
        self.state.send_modify(|s| {
            s.user = user;
            s.is_bootstrapping = false;
        });
    }

    /// Re-pull the identity after a server-side profile change.
    ///
    /// Unlike `bootstrap`, a failure here keeps the existing session —
    /// only the bootstrap call is allowed to clear a session on failure.
    pub async fn refresh_identity(&self) {
        if let Some(user) = self.introspect().await {
            self.state.send_modify(|s| s.user = Some(user));
        } else {
            tracing::warn!("session: identity refresh failed, keeping current user");
        }
    }

    /// Record a server-confirmed authentication.
    pub fn login(&self, identity: UserIdentity) {
        tracing::info!(username = %identity.username, "session: login");
        self.state.send_modify(|s| s.user = Some(identity));
    }

    /// Drop the local session. Idempotent, and deliberately independent of
    /// whether the server-side logout call succeeded — local state must
    /// never retain a dead session.
    pub fn logout(&self) {
        self.state.send_modify(|s| {
            if s.user.take().is_some() {
                tracing::info!("session: logout");
            }
        });
    }

    async fn introspect(&self) -> Option<UserIdentity> {
        match self.transport.get_json("/api/auth/current-user").await {
            Ok(value) => serde_json::from_value::<CurrentUserPayload>(value)
                .ok()
                .and_then(|payload| payload.user),
            Err(e) => {
                tracing::debug!("session: introspection failed: {e}");
                None
            }
        }
    }
}
