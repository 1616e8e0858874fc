//! Client configuration.

use std::time::Duration;

/// Default API base URL, including the `/api` prefix.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3100/api";

/// Default request timeout. Also bounds the refresh call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Paths of the auth endpoints, relative to the base URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthPaths {
    pub login: String,
    pub refresh: String,
    pub logout: String,
    pub me: String,
}

impl Default for AuthPaths {
    fn default() -> Self {
        Self {
            login: "/auth/login".into(),
            refresh: "/auth/refresh".into(),
            logout: "/auth/logout".into(),
            me: "/auth/me".into(),
        }
    }
}

/// Configuration for [`crate::HostSession`].
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL every request path is appended to (e.g. `http://host/api`).
    pub base_url: String,
    pub timeout: Duration,
    pub paths: AuthPaths,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            paths: AuthPaths::default(),
        }
    }

    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                | Default                         |
    /// |-------------------------|---------------------------------|
    /// | `HOSTAUTH_BASE_URL`     | `http://127.0.0.1:3100/api`     |
    /// | `HOSTAUTH_TIMEOUT_SECS` | `10`                            |
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("HOSTAUTH_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let timeout_secs = std::env::var("HOSTAUTH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self {
            timeout: Duration::from_secs(timeout_secs),
            ..Self::new(base_url)
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
