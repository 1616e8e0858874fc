//! API server configuration.

use crate::services::tokens::resolve_jwt_secret;

/// bcrypt cost used for the user directory unless overridden.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3100").
    pub bind_addr: String,
    /// HS256 signing secret for access tokens.
    pub jwt_secret: String,
    /// Add the `Secure` attribute to the refresh cookie. Enable behind HTTPS.
    pub cookie_secure: bool,
    /// bcrypt cost for password hashes in the user directory.
    pub bcrypt_cost: u32,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                          | Default                        |
    /// |-----------------------------------|--------------------------------|
    /// | `BIND_ADDR`                       | `127.0.0.1:3100`               |
    /// | `JWT_SECRET` / `JWT_ACCESS_SECRET` | generated & persisted to file |
    /// | `COOKIE_SECURE`                   | `false`                        |
    /// | `BCRYPT_COST`                     | `10`                           |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3100".into()),
            jwt_secret: resolve_jwt_secret(),
            cookie_secure: std::env::var("COOKIE_SECURE")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            bcrypt_cost: std::env::var("BCRYPT_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_BCRYPT_COST),
        }
    }
}
