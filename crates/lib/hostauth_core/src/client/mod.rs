//! Request interceptor.
//!
//! [`ApiClient`] wraps a [`Transport`]: it attaches the current bearer token,
//! and on a 401 for an ordinary API request it obtains a fresh token from the
//! [`RefreshCoordinator`] and resubmits the request exactly once.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::coordinator::RefreshCoordinator;
use crate::error::{ClientError, ClientResult};
use crate::notice::{self, HttpErrorHandler, Presentation};
use crate::session::SessionStore;
use crate::transport::{ApiRequest, ApiResponse, RequestKind, Transport, TransportError};

/// HTTP client front-end that keeps requests authenticated.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    coordinator: Arc<RefreshCoordinator>,
    error_handler: Option<Arc<dyn HttpErrorHandler>>,
    silent_statuses: Vec<u16>,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        session: Arc<SessionStore>,
        coordinator: Arc<RefreshCoordinator>,
    ) -> Self {
        Self {
            transport,
            session,
            coordinator,
            error_handler: None,
            silent_statuses: Vec::new(),
        }
    }

    /// Report failed requests to `handler`.
    pub fn with_error_handler(mut self, handler: Arc<dyn HttpErrorHandler>) -> Self {
        self.error_handler = Some(handler);
        self
    }

    /// Statuses that never reach the error handler.
    pub fn with_silent_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.silent_statuses = statuses.into_iter().collect();
        self
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub async fn get(&self, path: &str) -> ClientResult<ApiResponse> {
        self.execute(ApiRequest::get(path)).await
    }

    pub async fn post(&self, path: &str, body: serde_json::Value) -> ClientResult<ApiResponse> {
        self.execute(ApiRequest::post(path).with_body(body)).await
    }

    /// Send `request`, renewing the access token once if the server rejects it.
    pub async fn execute(&self, mut request: ApiRequest) -> ClientResult<ApiResponse> {
        self.attach_bearer(&mut request);

        let err = match self.transport.send(&request).await {
            Ok(response) => return Ok(response),
            Err(e) => e,
        };

        if !self.should_refresh(&request, &err) {
            return Err(self.fail(&request, err));
        }

        request.mark_retried();
        debug!(request_id = %request.request_id, path = %request.path, "401, waiting for token");
        let token = self.coordinator.acquire_token().await?;

        request.bearer = Some(token);
        debug!(request_id = %request.request_id, path = %request.path, "resubmitting");
        self.transport
            .send(&request)
            .await
            .map_err(|e| self.fail(&request, e))
    }

    /// Attach the stored token to API requests. An empty store sends the
    /// request without credentials.
    fn attach_bearer(&self, request: &mut ApiRequest) {
        if !request.kind.carries_bearer() {
            return;
        }
        let token = self.session.access_token();
        request.bearer = (!token.is_empty()).then_some(token);
    }

    fn should_refresh(&self, request: &ApiRequest, err: &TransportError) -> bool {
        if !err.is_authorization_failure() {
            return false;
        }
        match request.kind {
            // A failing refresh must never trigger another refresh.
            RequestKind::Refresh | RequestKind::Login | RequestKind::Logout => false,
            RequestKind::Api => !request.is_retried(),
        }
    }

    fn fail(&self, request: &ApiRequest, err: TransportError) -> ClientError {
        if let Some(handler) = &self.error_handler
            && let Some(notice) = notice::for_error(&err)
            && notice.presentation != Presentation::Silent
            && !self.silent_statuses.contains(&notice.status)
        {
            handler.on_http_error(&notice);
        }
        if err.status().is_none() {
            warn!(request_id = %request.request_id, path = %request.path, error = %err, "request failed");
        } else {
            debug!(request_id = %request.request_id, path = %request.path, error = %err, "request failed");
        }
        ClientError::from(err)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("session", &self.session)
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}
