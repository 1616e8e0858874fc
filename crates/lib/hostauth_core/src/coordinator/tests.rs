use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use super::*;
use crate::models::auth::{Role, User};

fn user() -> User {
    User {
        id: "1".into(),
        name: "Admin".into(),
        email: "admin@test.com".into(),
        role: Role::Admin,
    }
}

/// Refresher that blocks until the test hands out a permit.
struct GatedRefresher {
    calls: AtomicU32,
    gate: Semaphore,
    succeed: bool,
}

impl GatedRefresher {
    fn new(succeed: bool) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            gate: Semaphore::new(0),
            succeed,
        })
    }

    fn open(&self) {
        self.gate.add_permits(Semaphore::MAX_PERMITS / 2);
    }
}

#[async_trait]
impl TokenRefresher for GatedRefresher {
    async fn refresh(&self) -> Result<AuthSession, TransportError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.gate.acquire().await.unwrap().forget();
        if self.succeed {
            Ok(AuthSession {
                access_token: format!("token-{n}"),
                user: user(),
            })
        } else {
            Err(TransportError::from_status(401, "refresh token expired"))
        }
    }
}

#[derive(Default)]
struct CountingRedirect(AtomicU32);

impl LoginRedirect for CountingRedirect {
    fn login_required(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn setup(
    refresher: Arc<GatedRefresher>,
) -> (Arc<RefreshCoordinator>, Arc<SessionStore>, Arc<CountingRedirect>) {
    let session = Arc::new(SessionStore::new());
    let redirect = Arc::new(CountingRedirect::default());
    let coordinator = Arc::new(RefreshCoordinator::new(
        session.clone(),
        refresher,
        redirect.clone(),
    ));
    (coordinator, session, redirect)
}

async fn wait_for_pending(coordinator: &RefreshCoordinator, n: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !(coordinator.is_refreshing() && coordinator.pending() == n) {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("waiters did not queue up");
}

#[tokio::test]
async fn concurrent_callers_share_one_refresh() {
    let refresher = GatedRefresher::new(true);
    let (coordinator, session, redirect) = setup(refresher.clone());

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let c = coordinator.clone();
            tokio::spawn(async move { c.acquire_token().await })
        })
        .collect();

    wait_for_pending(&coordinator, 4).await;
    refresher.open();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), Ok("token-1".to_string()));
    }
    assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
    assert_eq!(session.access_token(), "token-1");
    assert_eq!(session.user(), Some(user()));
    assert_eq!(redirect.0.load(Ordering::SeqCst), 0);
    assert!(!coordinator.is_refreshing());
    assert_eq!(coordinator.pending(), 0);
}

#[tokio::test]
async fn failed_refresh_rejects_all_and_redirects_once() {
    let refresher = GatedRefresher::new(false);
    let (coordinator, session, redirect) = setup(refresher.clone());
    session.establish("old", user());

    let handles: Vec<_> = (0..3)
        .map(|_| {
            let c = coordinator.clone();
            tokio::spawn(async move { c.acquire_token().await })
        })
        .collect();

    wait_for_pending(&coordinator, 2).await;
    refresher.open();

    for handle in handles {
        let outcome = handle.await.unwrap();
        assert!(matches!(outcome, Err(RefreshFailure::Rejected(_))));
    }
    assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
    assert_eq!(redirect.0.load(Ordering::SeqCst), 1);
    assert!(!session.is_authenticated());
    assert!(session.user().is_none());
    assert!(!coordinator.is_refreshing());
}

#[tokio::test]
async fn waiters_observe_committed_token() {
    let refresher = GatedRefresher::new(true);
    let (coordinator, session, _) = setup(refresher.clone());

    let leader = {
        let c = coordinator.clone();
        tokio::spawn(async move { c.acquire_token().await })
    };
    let waiter = {
        let c = coordinator.clone();
        let s = session.clone();
        tokio::spawn(async move {
            let token = c.acquire_token().await.unwrap();
            // The store was updated before the queue drained.
            assert_eq!(s.access_token(), token);
            token
        })
    };

    wait_for_pending(&coordinator, 1).await;
    refresher.open();

    assert_eq!(leader.await.unwrap().unwrap(), "token-1");
    assert_eq!(waiter.await.unwrap(), "token-1");
}

#[tokio::test]
async fn settled_coordinator_starts_fresh_refresh() {
    let refresher = GatedRefresher::new(true);
    refresher.open();
    let (coordinator, session, _) = setup(refresher.clone());

    assert_eq!(coordinator.acquire_token().await.unwrap(), "token-1");
    assert_eq!(coordinator.acquire_token().await.unwrap(), "token-2");
    assert_eq!(refresher.calls.load(Ordering::SeqCst), 2);
    assert_eq!(session.access_token(), "token-2");
}

#[tokio::test]
async fn dropped_leader_releases_waiters() {
    let refresher = GatedRefresher::new(true);
    let (coordinator, session, redirect) = setup(refresher.clone());

    let leader = {
        let c = coordinator.clone();
        tokio::spawn(async move { c.acquire_token().await })
    };
    let waiter = {
        let c = coordinator.clone();
        tokio::spawn(async move { c.acquire_token().await })
    };

    wait_for_pending(&coordinator, 1).await;
    leader.abort();
    let _ = leader.await;

    assert_eq!(waiter.await.unwrap(), Err(RefreshFailure::Abandoned));
    assert!(!coordinator.is_refreshing());
    assert_eq!(coordinator.pending(), 0);
    // Abandonment is not a credential failure.
    assert_eq!(redirect.0.load(Ordering::SeqCst), 0);
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn failed_restore_clears_session_without_redirect() {
    let refresher = GatedRefresher::new(false);
    refresher.open();
    let (coordinator, session, redirect) = setup(refresher.clone());
    session.establish("stale", user());

    let outcome = coordinator.restore_token().await;

    assert!(matches!(outcome, Err(RefreshFailure::Rejected(_))));
    assert_eq!(redirect.0.load(Ordering::SeqCst), 0);
    assert!(!session.is_authenticated());
    assert!(!coordinator.is_refreshing());
}

#[tokio::test]
async fn restore_joins_refresh_in_flight() {
    let refresher = GatedRefresher::new(true);
    let (coordinator, session, _) = setup(refresher.clone());

    let leader = {
        let c = coordinator.clone();
        tokio::spawn(async move { c.acquire_token().await })
    };
    wait_for_pending(&coordinator, 0).await;
    let restore = {
        let c = coordinator.clone();
        tokio::spawn(async move { c.restore_token().await })
    };

    wait_for_pending(&coordinator, 1).await;
    refresher.open();

    assert_eq!(leader.await.unwrap(), Ok("token-1".to_string()));
    assert_eq!(restore.await.unwrap(), Ok("token-1".to_string()));
    assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
    assert_eq!(session.access_token(), "token-1");
}
