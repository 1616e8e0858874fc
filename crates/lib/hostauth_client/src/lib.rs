//! # hostauth_client
//!
//! HTTP client for the host auth API.
//!
//! [`HostSession`] wires a [`SessionStore`], a reqwest [`HttpTransport`], a
//! [`RefreshCoordinator`] and the [`AuthApi`] together. Nothing is global:
//! each `HostSession` is an independent session.

pub mod auth;
pub mod config;
pub mod transport;

use std::sync::Arc;

use hostauth_core::coordinator::{LoginRedirect, RefreshCoordinator};
use hostauth_core::session::{NoPersistence, SessionPersistence, SessionStore};
use hostauth_core::{ApiClient, Transport};
use thiserror::Error;

pub use auth::{AuthApi, HttpRefresher};
pub use config::{AuthPaths, ClientConfig};
pub use transport::HttpTransport;

/// Errors building a client.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// One client-side session: store, interceptor and auth calls.
pub struct HostSession {
    session: Arc<SessionStore>,
    api: ApiClient,
    auth: AuthApi,
}

impl HostSession {
    /// Build a session over HTTP, sending the login redirect to `redirect`.
    pub fn connect(
        config: &ClientConfig,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Result<Self, SetupError> {
        let transport = Arc::new(HttpTransport::new(config)?);
        Ok(Self::with_transport(
            transport,
            config,
            redirect,
            Arc::new(NoPersistence),
        ))
    }

    /// Build a session over any transport.
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        config: &ClientConfig,
        redirect: Arc<dyn LoginRedirect>,
        persistence: Arc<dyn SessionPersistence>,
    ) -> Self {
        let session = Arc::new(SessionStore::with_persistence(persistence));
        let refresher = Arc::new(HttpRefresher::new(
            transport.clone(),
            config.paths.refresh.clone(),
        ));
        let coordinator = Arc::new(RefreshCoordinator::new(
            session.clone(),
            refresher,
            redirect,
        ));
        let api = ApiClient::new(transport, session.clone(), coordinator);
        let auth = AuthApi::new(api.clone(), config.paths.clone());
        Self { session, api, auth }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Interceptor for application API calls.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn auth(&self) -> &AuthApi {
        &self.auth
    }
}
