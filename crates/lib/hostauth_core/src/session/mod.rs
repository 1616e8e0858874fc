//! Session store: the in-memory access token and user record.
//!
//! The store never fails; it only mutates state. All writes go through a
//! single `RwLock`, so readers see either the old or the new token/user pair,
//! never a mix of the two.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::watch;
use tracing::debug;

use crate::models::auth::User;

/// External collaborator that may hold a persisted copy of the session.
///
/// `clear` is invoked on every logout so that the collaborator drops its copy.
pub trait SessionPersistence: Send + Sync {
    fn clear(&self);
}

/// Persistence collaborator for hosts that keep nothing outside memory.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPersistence;

impl SessionPersistence for NoPersistence {
    fn clear(&self) {}
}

/// Snapshot of the current credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Opaque bearer credential. Empty means unauthenticated.
    pub access_token: String,
    pub user: Option<User>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        !self.access_token.is_empty()
    }
}

/// Holds the current access token and user for one running application.
pub struct SessionStore {
    inner: RwLock<Session>,
    persistence: Arc<dyn SessionPersistence>,
    authenticated: watch::Sender<bool>,
}

impl SessionStore {
    /// Create an empty store with no persistence collaborator.
    pub fn new() -> Self {
        Self::with_persistence(Arc::new(NoPersistence))
    }

    /// Create an empty store that notifies `persistence` on logout.
    pub fn with_persistence(persistence: Arc<dyn SessionPersistence>) -> Self {
        let (authenticated, _) = watch::channel(false);
        Self {
            inner: RwLock::new(Session::default()),
            persistence,
            authenticated,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish the authenticated signal. Called with the write guard held so
    /// notifications follow commit order.
    fn publish(&self, session: &Session) {
        let now = session.is_authenticated();
        self.authenticated.send_if_modified(|current| {
            if *current == now {
                return false;
            }
            *current = now;
            true
        });
    }

    /// Replace the access token. The token is opaque and not validated.
    pub fn set_access_token(&self, token: impl Into<String>) {
        let mut session = self.write();
        session.access_token = token.into();
        self.publish(&session);
    }

    /// Replace the user record.
    pub fn set_user(&self, user: Option<User>) {
        let mut session = self.write();
        session.user = user;
    }

    /// Install a token together with its owning user in one step.
    pub fn establish(&self, token: impl Into<String>, user: User) {
        let mut session = self.write();
        session.access_token = token.into();
        session.user = Some(user);
        self.publish(&session);
        debug!(user_id = session.user.as_ref().map(|u| u.id.as_str()), "session established");
    }

    /// Clear token and user together and tell the persistence collaborator
    /// to drop its copy. Safe to call any number of times.
    pub fn logout(&self) {
        {
            let mut session = self.write();
            session.access_token.clear();
            session.user = None;
            self.publish(&session);
        }
        self.persistence.clear();
        debug!("session cleared");
    }

    /// Current access token; empty when unauthenticated.
    pub fn access_token(&self) -> String {
        self.read().access_token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    /// Consistent copy of token and user.
    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    /// Watch the authenticated signal. The receiver sees every transition
    /// between authenticated and unauthenticated.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.authenticated.subscribe()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.read();
        f.debug_struct("SessionStore")
            .field("authenticated", &session.is_authenticated())
            .field("user", &session.user)
            .finish_non_exhaustive()
    }
}
