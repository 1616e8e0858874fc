//! Refresh coordinator — single-flight renewal of the access token.
//!
//! The coordinator is either idle or refreshing. The first caller that needs
//! a token while idle becomes the leader and runs the refresh; every caller
//! arriving while a refresh is in flight joins the pending queue and is
//! released, oldest first, when the leader settles.
//!
//! The flag and the queue live behind one mutex that is never held across an
//! `.await`, so no two refreshes can ever overlap.

pub mod queue;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::error::RefreshFailure;
use crate::models::auth::AuthSession;
use crate::session::SessionStore;
use crate::transport::TransportError;

pub use queue::{PendingQueue, RefreshOutcome};

/// Performs the renewal call.
///
/// The long-lived renewal credential is supplied by the implementation (for
/// example a cookie jar in the HTTP client); the coordinator never sees it.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self) -> Result<AuthSession, TransportError>;
}

/// External "send the user to the login screen" action.
pub trait LoginRedirect: Send + Sync {
    fn login_required(&self);
}

impl<F> LoginRedirect for F
where
    F: Fn() + Send + Sync,
{
    fn login_required(&self) {
        self()
    }
}

/// Redirect target for hosts without a login surface.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRedirect;

impl LoginRedirect for NoRedirect {
    fn login_required(&self) {}
}

#[derive(Debug, Default)]
struct RefreshState {
    refreshing: bool,
    queue: PendingQueue,
}

/// Whether a failed refresh led by this caller fires the login signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnFailure {
    Redirect,
    Quiet,
}

enum Turn {
    Leader,
    Waiter(oneshot::Receiver<RefreshOutcome>),
}

/// Owns the refresh state machine for one session.
pub struct RefreshCoordinator {
    session: Arc<SessionStore>,
    refresher: Arc<dyn TokenRefresher>,
    redirect: Arc<dyn LoginRedirect>,
    state: Mutex<RefreshState>,
}

impl RefreshCoordinator {
    pub fn new(
        session: Arc<SessionStore>,
        refresher: Arc<dyn TokenRefresher>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Self {
        Self {
            session,
            refresher,
            redirect,
            state: Mutex::new(RefreshState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a refresh is in flight.
    pub fn is_refreshing(&self) -> bool {
        self.lock().refreshing
    }

    /// Number of callers suspended on the in-flight refresh.
    pub fn pending(&self) -> usize {
        self.lock().queue.len()
    }

    /// Obtain a fresh access token, starting a refresh or joining the one in
    /// flight.
    ///
    /// On success the session store already holds the returned token. On
    /// failure the session has been cleared and the login redirect fired
    /// (once per failed refresh, not once per caller).
    pub async fn acquire_token(&self) -> RefreshOutcome {
        self.acquire(OnFailure::Redirect).await
    }

    /// Same single-flight refresh for restoring a session at startup.
    ///
    /// If this call leads the refresh and it fails, the session is cleared but
    /// the login signal does not fire: having no renewal cookie is the normal
    /// first-visit state. Joining a refresh already in flight shares its
    /// outcome, including its redirect.
    pub async fn restore_token(&self) -> RefreshOutcome {
        self.acquire(OnFailure::Quiet).await
    }

    async fn acquire(&self, on_failure: OnFailure) -> RefreshOutcome {
        let turn = {
            let mut state = self.lock();
            if state.refreshing {
                let (tx, rx) = oneshot::channel();
                state.queue.push(move |outcome| {
                    // The waiter may have been dropped; nothing to deliver then.
                    let _ = tx.send(outcome);
                });
                debug!(pending = state.queue.len(), "joined in-flight refresh");
                Turn::Waiter(rx)
            } else {
                state.refreshing = true;
                Turn::Leader
            }
        };

        match turn {
            Turn::Waiter(rx) => rx.await.unwrap_or(Err(RefreshFailure::Abandoned)),
            Turn::Leader => self.lead(on_failure).await,
        }
    }

    async fn lead(&self, on_failure: OnFailure) -> RefreshOutcome {
        let mut guard = LeaderGuard {
            coordinator: self,
            armed: true,
        };

        info!("refreshing access token");
        let outcome = match self.refresher.refresh().await {
            Ok(AuthSession { access_token, user }) => {
                // Commit before releasing anyone so resubmitted requests and
                // new requests read the same token.
                self.session.establish(access_token.clone(), user);
                Ok(access_token)
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed, clearing session");
                self.session.logout();
                if on_failure == OnFailure::Redirect {
                    self.redirect.login_required();
                }
                Err(RefreshFailure::Rejected(e))
            }
        };

        guard.armed = false;
        let released = self.finish(&outcome);
        debug!(released, ok = outcome.is_ok(), "refresh settled");
        outcome
    }

    /// Return to idle and release every waiter with `outcome`.
    fn finish(&self, outcome: &RefreshOutcome) -> usize {
        let drained = {
            let mut state = self.lock();
            state.refreshing = false;
            state.queue.take()
        };
        drained.release(outcome)
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("RefreshCoordinator")
            .field("refreshing", &state.refreshing)
            .field("pending", &state.queue.len())
            .finish_non_exhaustive()
    }
}

/// Returns the coordinator to idle if the leader is dropped mid-refresh.
struct LeaderGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    armed: bool,
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let released = self
                .coordinator
                .finish(&Err(RefreshFailure::Abandoned));
            warn!(released, "refresh leader dropped before settling");
        }
    }
}

#[cfg(test)]
mod tests;
