//! HTTP error classification for the host's notification surface.
//!
//! Turns a failed request into a [`HttpErrorNotice`] that a UI layer can show
//! as a toast or a modal. Rendering is not done here.

use crate::models::ErrorDetail;
use crate::transport::TransportError;

/// How a host should present an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    Toast,
    Modal,
    /// Not shown. Used for 401, which the refresh path handles.
    Silent,
}

/// A classified HTTP failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpErrorNotice {
    /// HTTP status, or 0 when no response was received.
    pub status: u16,
    pub title: String,
    pub message: String,
    pub presentation: Presentation,
    /// Field-level validation problems reported by the server.
    pub details: Vec<ErrorDetail>,
}

/// Receives notices for failed requests.
pub trait HttpErrorHandler: Send + Sync {
    fn on_http_error(&self, notice: &HttpErrorNotice);
}

impl<F> HttpErrorHandler for F
where
    F: Fn(&HttpErrorNotice) + Send + Sync,
{
    fn on_http_error(&self, notice: &HttpErrorNotice) {
        self(notice)
    }
}

fn defaults(status: u16) -> (&'static str, &'static str, Presentation) {
    use Presentation::*;
    match status {
        0 => ("Network error", "Check your network connection.", Toast),
        400 => ("Bad request", "The request is invalid. Check your input.", Toast),
        401 => ("Authentication required", "Please sign in.", Silent),
        403 => ("Forbidden", "You do not have access to this resource.", Toast),
        404 => ("Not found", "The requested resource could not be found.", Toast),
        408 => ("Request timeout", "The request timed out. Please try again.", Toast),
        409 => ("Conflict", "The request conflicts with the current server state.", Toast),
        422 => ("Unprocessable", "The request data could not be processed.", Toast),
        429 => ("Too many requests", "Too many requests. Please wait and try again.", Toast),
        500 => ("Server error", "The server ran into a problem. Please try again later.", Modal),
        502 => ("Bad gateway", "Unable to reach the server.", Modal),
        503 => ("Service unavailable", "The service is temporarily unavailable.", Modal),
        504 => ("Gateway timeout", "The server took too long to respond.", Modal),
        _ => ("Error", "", Toast),
    }
}

/// Classify `status`. A non-empty `server_message` replaces the default text.
pub fn classify(status: u16, server_message: Option<&str>) -> HttpErrorNotice {
    let (title, default_message, presentation) = defaults(status);
    let message = match server_message.filter(|m| !m.is_empty()) {
        Some(m) => m.to_string(),
        None if default_message.is_empty() => format!("Unexpected error ({status})."),
        None => default_message.to_string(),
    };
    HttpErrorNotice {
        status,
        title: title.to_string(),
        message,
        presentation,
        details: Vec::new(),
    }
}

/// Classify a transport failure. Decode failures are programming errors and
/// produce no notice.
pub fn for_error(err: &TransportError) -> Option<HttpErrorNotice> {
    match err {
        TransportError::Network(_) => Some(classify(0, None)),
        TransportError::Decode(_) => None,
        other => other.status().map(|s| HttpErrorNotice {
            details: other.details().to_vec(),
            ..classify(s, Some(other.message()))
        }),
    }
}
