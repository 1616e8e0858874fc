//! # hostauth_core
//!
//! Session state and the token refresh protocol shared by every host client.
//!
//! The pieces fit together as follows: [`session::SessionStore`] holds the
//! current access token and user, [`transport::Transport`] sends requests,
//! [`coordinator::RefreshCoordinator`] guarantees a single in-flight refresh,
//! and [`client::ApiClient`] is the interceptor that ties them together.

pub mod client;
pub mod coordinator;
pub mod error;
pub mod models;
pub mod notice;
pub mod session;
pub mod transport;

pub use client::ApiClient;
pub use coordinator::{LoginRedirect, RefreshCoordinator, TokenRefresher};
pub use error::{ClientError, ClientResult};
pub use models::auth::{AuthSession, Role, User};
pub use session::{SessionPersistence, SessionStore};
pub use transport::{ApiRequest, ApiResponse, RequestKind, Transport, TransportError};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
