//! Access-token JWTs and opaque refresh credentials.

use std::path::PathBuf;

use chrono::{Duration, Utc};
use hostauth_core::models::auth::{Role, User};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{info, warn};

use crate::error::AppResult;

/// Access token lifetime: 15 minutes.
pub const ACCESS_TOKEN_EXPIRY_SECS: i64 = 15 * 60;

/// Refresh credential lifetime: 7 days.
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 7;

/// JWT claims embedded in access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID).
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
}

/// Generate a signed JWT access token (HS256, 15 min expiry).
pub fn generate_access_token(user: &User, secret: &[u8]) -> AppResult<String> {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: user.id.clone(),
        email: user.email.clone(),
        role: user.role,
        exp: (now + Duration::seconds(ACCESS_TOKEN_EXPIRY_SECS)).timestamp(),
        iat: now.timestamp(),
    };
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )?)
}

/// Why an access token was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenRejection {
    #[error("Token expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
}

/// Verify a JWT access token, returning the claims on success.
pub fn verify_access_token(token: &str, secret: &[u8]) -> Result<TokenClaims, TokenRejection> {
    let key = DecodingKey::from_secret(secret);
    let mut validation = Validation::default();
    validation.validate_exp = true;
    decode::<TokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenRejection::Expired,
            _ => TokenRejection::Invalid,
        })
}

/// Generate a random refresh credential (64 alphanumeric chars).
pub fn generate_refresh_token() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// SHA-256 hash of a refresh credential. Only hashes are stored.
pub fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Resolve the JWT secret: env var `JWT_SECRET` → `JWT_ACCESS_SECRET` → persisted file.
pub fn resolve_jwt_secret() -> String {
    for var in ["JWT_SECRET", "JWT_ACCESS_SECRET"] {
        if let Ok(secret) = std::env::var(var)
            && !secret.is_empty()
        {
            return secret;
        }
    }
    load_or_create_secret(&jwt_secret_path())
}

/// Read the secret at `path`, generating and persisting one if absent.
pub fn load_or_create_secret(path: &std::path::Path) -> String {
    if let Ok(existing) = std::fs::read_to_string(path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret = generate_refresh_token();
    if let Some(parent) = path.parent()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        warn!(path = %parent.display(), error = %e, "cannot create secret directory");
    }
    match std::fs::write(path, &secret) {
        Ok(()) => info!(path = %path.display(), "generated new JWT secret"),
        Err(e) => warn!(path = %path.display(), error = %e, "JWT secret not persisted"),
    }
    secret
}

/// Path to the persisted JWT secret file.
fn jwt_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hostauth")
        .join("jwt-secret")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> User {
        User {
            id: "1".into(),
            name: "Admin".into(),
            email: "admin@test.com".into(),
            role: Role::Admin,
        }
    }

    #[test]
    fn access_token_roundtrip_carries_role() {
        let token = generate_access_token(&admin(), b"secret").unwrap();
        let claims = verify_access_token(&token, b"secret").unwrap();
        assert_eq!(claims.sub, "1");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, ACCESS_TOKEN_EXPIRY_SECS);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_access_token(&admin(), b"secret").unwrap();
        assert_eq!(
            verify_access_token(&token, b"other").unwrap_err(),
            TokenRejection::Invalid
        );
        assert_eq!(
            verify_access_token("garbage", b"secret").unwrap_err(),
            TokenRejection::Invalid
        );
    }

    #[test]
    fn expired_token_is_told_apart() {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: "1".into(),
            email: "admin@test.com".into(),
            role: Role::Admin,
            exp: now - 3600,
            iat: now - 4500,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        assert_eq!(
            verify_access_token(&token, b"secret").unwrap_err(),
            TokenRejection::Expired
        );
    }

    #[test]
    fn refresh_tokens_are_unique_and_hashed() {
        let a = generate_refresh_token();
        let b = generate_refresh_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert_eq!(hash_refresh_token(&a), hash_refresh_token(&a));
        assert_ne!(hash_refresh_token(&a), a);
    }

    #[test]
    fn secret_is_persisted_and_reused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("jwt-secret");
        let first = load_or_create_secret(&path);
        let second = load_or_create_secret(&path);
        assert_eq!(first, second);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
    }
}
