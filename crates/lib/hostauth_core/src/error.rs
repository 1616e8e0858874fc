//! Caller-facing error types.

use thiserror::Error;

use crate::models::ErrorDetail;
use crate::transport::TransportError;

/// Convenience alias for interceptor results.
pub type ClientResult<T> = Result<T, ClientError>;

/// Why a refresh attempt did not produce a token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshFailure {
    /// The renewal credential was missing, expired or rejected, or the refresh
    /// call failed in transport.
    #[error("refresh rejected: {0}")]
    Rejected(TransportError),

    /// The refreshing task was dropped before the refresh settled.
    #[error("refresh abandoned before it settled")]
    Abandoned,
}

/// Errors surfaced to code issuing requests through [`crate::ApiClient`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// 401 that was not recovered: the refresh endpoint itself, a request that
    /// was already retried once, or a non-API request.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// 403. Never triggers a refresh.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The refresh was rejected. The session has been cleared and the login
    /// signal has fired.
    #[error("Session expired: {0}")]
    RefreshExhausted(String),

    /// The task running the refresh was dropped before it settled. The
    /// session is untouched and no login signal fired; retrying is safe.
    #[error("Refresh abandoned")]
    RefreshAbandoned,

    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        details: Vec<ErrorDetail>,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<TransportError> for ClientError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Unauthenticated { message } => ClientError::Unauthenticated(message),
            TransportError::Forbidden { message } => ClientError::Forbidden(message),
            TransportError::Status {
                status,
                message,
                details,
            } => ClientError::Http {
                status,
                message,
                details,
            },
            TransportError::Network(m) => ClientError::Network(m),
            TransportError::Decode(m) => ClientError::Decode(m),
        }
    }
}

impl From<RefreshFailure> for ClientError {
    fn from(e: RefreshFailure) -> Self {
        match e {
            RefreshFailure::Rejected(cause) => ClientError::RefreshExhausted(cause.to_string()),
            RefreshFailure::Abandoned => ClientError::RefreshAbandoned,
        }
    }
}

impl ClientError {
    /// True when the caller should treat the user as logged out.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ClientError::RefreshExhausted(_))
    }
}
