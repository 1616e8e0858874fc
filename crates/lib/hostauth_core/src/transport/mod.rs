//! Transport boundary: requests, responses and the tagged error type.
//!
//! Status codes are classified exactly once, here. Everything above this
//! module matches on [`TransportError`] variants instead of raw numbers.

use async_trait::async_trait;
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Envelope, ErrorDetail};

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// What a request is for. Decides bearer attachment and refresh eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Ordinary API call. Carries the bearer token and may be retried once.
    Api,
    Login,
    /// The renewal call itself. Its failures are never retried.
    Refresh,
    Logout,
}

impl RequestKind {
    pub fn carries_bearer(self) -> bool {
        matches!(self, RequestKind::Api)
    }
}

/// An outbound HTTP request, independent of the HTTP library that sends it.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the client's base URL, e.g. `/auth/me`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub kind: RequestKind,
    /// Bearer token attached by the interceptor just before sending.
    pub bearer: Option<String>,
    /// Correlation id for the logical request. Kept across the retry.
    pub request_id: Uuid,
    retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            kind: RequestKind::Api,
            bearer: None,
            request_id: Uuid::new_v4(),
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_kind(mut self, kind: RequestKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Query pairs to put on the wire. Pairs with an empty value are dropped.
    pub fn effective_query(&self) -> impl Iterator<Item = (&str, &str)> {
        self.query
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Authorization` header value, if a bearer token is attached.
    pub fn authorization(&self) -> Option<String> {
        self.bearer.as_ref().map(|t| format!("Bearer {t}"))
    }

    /// Whether the interceptor has already scheduled a retry for this request.
    pub fn is_retried(&self) -> bool {
        self.retried
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }
}

/// A successful (2xx) response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: serde_json::Value,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: serde_json::Value) -> Self {
        Self { status, body }
    }

    /// Deserialize the whole body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        serde_json::from_value(self.body.clone())
            .map_err(|e| TransportError::Decode(format!("response body: {e}")))
    }

    /// Deserialize the `data` field of a `{ statusCode, data }` envelope.
    pub fn data<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        self.json::<Envelope<T>>().map(|envelope| envelope.data)
    }
}

/// Failure reported by a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Missing, invalid or expired access token (401). Recoverable by refresh.
    #[error("Unauthenticated: {message}")]
    Unauthenticated { message: String },

    /// Valid credentials without sufficient privilege (403). Refresh won't help.
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Any other non-success HTTP status, with field-level details when the
    /// server sent them.
    #[error("HTTP {status}: {message}")]
    Status {
        status: u16,
        message: String,
        details: Vec<ErrorDetail>,
    },

    /// Connection, TLS or timeout failure. No response was received.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

impl TransportError {
    /// Classify a non-success status code.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => TransportError::Unauthenticated { message },
            403 => TransportError::Forbidden { message },
            _ => TransportError::Status {
                status,
                message,
                details: Vec::new(),
            },
        }
    }

    /// Attach server-reported field details. Only generic status errors carry them.
    pub fn with_details(mut self, new_details: Vec<ErrorDetail>) -> Self {
        if let TransportError::Status { details, .. } = &mut self {
            *details = new_details;
        }
        self
    }

    pub fn details(&self) -> &[ErrorDetail] {
        match self {
            TransportError::Status { details, .. } => details,
            _ => &[],
        }
    }

    /// True only for failures a token refresh can recover from.
    pub fn is_authorization_failure(&self) -> bool {
        matches!(self, TransportError::Unauthenticated { .. })
    }

    /// HTTP status, or `None` when no response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Unauthenticated { .. } => Some(401),
            TransportError::Forbidden { .. } => Some(403),
            TransportError::Status { status, .. } => Some(*status),
            TransportError::Network(_) | TransportError::Decode(_) => None,
        }
    }

    /// Server-provided or locally generated message text.
    pub fn message(&self) -> &str {
        match self {
            TransportError::Unauthenticated { message }
            | TransportError::Forbidden { message }
            | TransportError::Status { message, .. } => message,
            TransportError::Network(m) | TransportError::Decode(m) => m,
        }
    }
}

/// Sends one request and reports the outcome.
///
/// Implementations must not retry on their own and must report a 401 as
/// [`TransportError::Unauthenticated`]. Platform credentials such as the
/// renewal cookie are the implementation's business.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}
