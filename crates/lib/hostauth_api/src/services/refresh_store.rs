//! In-memory store of issued refresh credentials.
//!
//! Credentials are single-use: presenting one removes it, and a successful
//! refresh issues a replacement. A credential that was rotated away is
//! therefore rejected on its next use.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use super::tokens::{REFRESH_TOKEN_EXPIRY_DAYS, generate_refresh_token, hash_refresh_token};

#[derive(Debug, Clone)]
struct RefreshRecord {
    user_id: String,
    expires_at: DateTime<Utc>,
}

/// Refresh credentials keyed by their SHA-256 hash.
#[derive(Debug)]
pub struct RefreshTokenStore {
    tokens: DashMap<String, RefreshRecord>,
    ttl: chrono::Duration,
}

impl RefreshTokenStore {
    pub fn new() -> Self {
        Self::with_ttl(chrono::Duration::days(REFRESH_TOKEN_EXPIRY_DAYS))
    }

    pub fn with_ttl(ttl: chrono::Duration) -> Self {
        Self {
            tokens: DashMap::new(),
            ttl,
        }
    }

    /// Issue a new credential for `user_id`. Returns the plaintext value.
    pub fn issue(&self, user_id: &str) -> String {
        let token = generate_refresh_token();
        self.tokens.insert(
            hash_refresh_token(&token),
            RefreshRecord {
                user_id: user_id.to_string(),
                expires_at: Utc::now() + self.ttl,
            },
        );
        token
    }

    /// Consume `token`. Returns the owning user ID if it was live.
    pub fn consume(&self, token: &str) -> Option<String> {
        let (_, record) = self.tokens.remove(&hash_refresh_token(token))?;
        if record.expires_at <= Utc::now() {
            debug!(user_id = %record.user_id, "expired refresh token presented");
            return None;
        }
        Some(record.user_id)
    }

    /// Revoke `token` if it exists.
    pub fn revoke(&self, token: &str) {
        self.tokens.remove(&hash_refresh_token(token));
    }

    /// Revoke every credential belonging to `user_id`.
    pub fn revoke_user(&self, user_id: &str) {
        self.tokens.retain(|_, r| r.user_id != user_id);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Evict expired entries.
    pub fn cleanup(&self) {
        let now = Utc::now();
        self.tokens.retain(|_, r| r.expires_at > now);
    }

    /// Spawn a periodic cleanup task.
    pub fn spawn_cleanup_task(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(3600));
            loop {
                interval.tick().await;
                store.cleanup();
            }
        })
    }
}

impl Default for RefreshTokenStore {
    fn default() -> Self {
        Self::new()
    }
}
