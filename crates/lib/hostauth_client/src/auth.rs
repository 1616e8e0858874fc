//! Auth API calls: login, refresh, logout, current user and startup restore.

use std::sync::Arc;

use async_trait::async_trait;
use hostauth_core::models::auth::{AuthSession, LoginRequest, User, UserPayload};
use hostauth_core::{
    ApiClient, ApiRequest, ClientError, ClientResult, RequestKind, SessionStore, TokenRefresher,
    Transport, TransportError,
};
use tracing::{debug, info, warn};

use crate::config::AuthPaths;

/// Calls the refresh endpoint. The renewal cookie rides along in the
/// transport's cookie jar.
pub struct HttpRefresher {
    transport: Arc<dyn Transport>,
    path: String,
}

impl HttpRefresher {
    pub fn new(transport: Arc<dyn Transport>, path: impl Into<String>) -> Self {
        Self {
            transport,
            path: path.into(),
        }
    }
}

#[async_trait]
impl TokenRefresher for HttpRefresher {
    async fn refresh(&self) -> Result<AuthSession, TransportError> {
        let request = ApiRequest::post(self.path.as_str())
            .with_kind(RequestKind::Refresh)
            .with_body(serde_json::json!({}));
        self.transport.send(&request).await?.data()
    }
}

/// High-level auth operations on top of an [`ApiClient`].
pub struct AuthApi {
    client: ApiClient,
    paths: AuthPaths,
}

impl AuthApi {
    pub fn new(client: ApiClient, paths: AuthPaths) -> Self {
        Self { client, paths }
    }

    fn session(&self) -> &Arc<SessionStore> {
        self.client.session()
    }

    /// Authenticate with email and password and establish the session.
    ///
    /// A rejected login leaves the session untouched and does not trigger a
    /// refresh.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<User> {
        let body = serde_json::to_value(LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })
        .map_err(|e| ClientError::Decode(e.to_string()))?;
        let request = ApiRequest::post(self.paths.login.as_str())
            .with_kind(RequestKind::Login)
            .with_body(body);

        let AuthSession { access_token, user } = self.client.execute(request).await?.data()?;
        self.session().establish(access_token, user.clone());
        info!(user_id = %user.id, role = %user.role, "logged in");
        Ok(user)
    }

    /// Restore the session from the renewal cookie at startup.
    ///
    /// Goes through the coordinator, so it shares a refresh already in flight
    /// instead of racing it. A missing or expired cookie is the normal
    /// first-visit state: failure leaves the session empty, returns `false`
    /// and fires no login signal of its own.
    pub async fn initialize(&self) -> bool {
        match self.client.coordinator().restore_token().await {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "no session to restore");
                false
            }
        }
    }

    /// Renew the access token now, sharing any refresh already in flight.
    ///
    /// Failure clears the session and fires the login signal, exactly as a
    /// rejected API call would.
    pub async fn refresh(&self) -> ClientResult<String> {
        Ok(self.client.coordinator().acquire_token().await?)
    }

    /// Fetch the current user through the refreshing interceptor.
    pub async fn me(&self) -> ClientResult<User> {
        let resp = self.client.get(&self.paths.me).await?;
        let UserPayload { user } = resp.data()?;
        Ok(user)
    }

    /// Expire the renewal cookie server-side, then clear local state.
    ///
    /// The local session is cleared even when the server call fails.
    pub async fn logout(&self) {
        let request = ApiRequest::post(self.paths.logout.as_str())
            .with_kind(RequestKind::Logout)
            .with_body(serde_json::json!({}));
        if let Err(e) = self.client.execute(request).await {
            warn!(error = %e, "logout call failed, clearing local session anyway");
        }
        self.session().logout();
        info!("logged out");
    }
}
