//! Authentication flows: login, refresh rotation, logout and current user.

use hostauth_core::models::ErrorDetail;
use hostauth_core::models::auth::{AuthSession, User};
use tracing::{debug, info};

use super::refresh_store::RefreshTokenStore;
use super::tokens::{TokenClaims, generate_access_token};
use super::users::UserDirectory;
use crate::error::{AppError, AppResult};

/// A freshly issued session: the body payload plus the new refresh credential.
#[derive(Debug)]
pub struct IssuedSession {
    pub session: AuthSession,
    pub refresh_token: String,
}

fn issue(user: User, store: &RefreshTokenStore, jwt_secret: &[u8]) -> AppResult<IssuedSession> {
    let access_token = generate_access_token(&user, jwt_secret)?;
    let refresh_token = store.issue(&user.id);
    Ok(IssuedSession {
        session: AuthSession { access_token, user },
        refresh_token,
    })
}

/// Authenticate with email + password.
pub fn login(
    users: &UserDirectory,
    store: &RefreshTokenStore,
    email: &str,
    password: &str,
    jwt_secret: &[u8],
) -> AppResult<IssuedSession> {
    let mut missing = Vec::new();
    if email.trim().is_empty() {
        missing.push(ErrorDetail::field("required", "email", "Email is required"));
    }
    if password.is_empty() {
        missing.push(ErrorDetail::field("required", "password", "Password is required"));
    }
    if !missing.is_empty() {
        return Err(AppError::InvalidFields {
            message: "Email and password are required".into(),
            details: missing,
        });
    }

    // Same message for unknown email and wrong password.
    let user = users
        .authenticate(email, password)?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".into()))?;

    info!(user_id = %user.id, role = %user.role, "login succeeded");
    issue(user, store, jwt_secret)
}

/// Exchange a refresh credential for a new session.
///
/// The presented credential is consumed; the returned one replaces it.
pub fn refresh(
    users: &UserDirectory,
    store: &RefreshTokenStore,
    presented: Option<&str>,
    jwt_secret: &[u8],
) -> AppResult<IssuedSession> {
    let token = presented
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("No refresh token".into()))?;

    let user_id = store
        .consume(token)
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired refresh token".into()))?;

    let user = users
        .find_by_id(&user_id)
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".into()))?;

    debug!(user_id = %user.id, "refresh token rotated");
    issue(user, store, jwt_secret)
}

/// Revoke the presented refresh credential, if any. Never fails.
pub fn logout(store: &RefreshTokenStore, presented: Option<&str>) {
    match presented.filter(|t| !t.is_empty()) {
        Some(token) => {
            store.revoke(token);
            info!("refresh token revoked");
        }
        None => debug!("logout without refresh token"),
    }
}

/// Resolve the user behind verified access-token claims.
pub fn current_user(users: &UserDirectory, claims: &TokenClaims) -> AppResult<User> {
    users
        .find_by_id(&claims.sub)
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::tokens::verify_access_token;
    use hostauth_core::models::auth::Role;

    const SECRET: &[u8] = b"test-secret";

    fn fixtures() -> (UserDirectory, RefreshTokenStore) {
        (UserDirectory::seeded(4).unwrap(), RefreshTokenStore::new())
    }

    #[test]
    fn login_issues_verifiable_token_and_refresh_credential() {
        let (users, store) = fixtures();
        let issued = login(&users, &store, "admin@test.com", "1234", SECRET).unwrap();
        assert_eq!(issued.session.user.role, Role::Admin);
        let claims = verify_access_token(&issued.session.access_token, SECRET).unwrap();
        assert_eq!(claims.sub, "1");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn login_rejects_bad_credentials_uniformly() {
        let (users, store) = fixtures();
        for (email, password) in [("admin@test.com", "wrong"), ("ghost@test.com", "1234")] {
            match login(&users, &store, email, password, SECRET) {
                Err(AppError::Unauthorized(m)) => assert_eq!(m, "Invalid email or password"),
                other => panic!("expected unauthorized, got {other:?}"),
            }
        }
        assert!(store.is_empty());
    }

    #[test]
    fn login_requires_both_fields() {
        let (users, store) = fixtures();
        match login(&users, &store, "", "1234", SECRET) {
            Err(AppError::InvalidFields { details, .. }) => {
                assert_eq!(details.len(), 1);
                assert_eq!(details[0].field.as_deref(), Some("email"));
            }
            other => panic!("expected invalid fields, got {other:?}"),
        }
        match login(&users, &store, " ", "", SECRET) {
            Err(AppError::InvalidFields { details, .. }) => assert_eq!(details.len(), 2),
            other => panic!("expected invalid fields, got {other:?}"),
        }
    }

    #[test]
    fn refresh_rotates_and_old_credential_dies() {
        let (users, store) = fixtures();
        let first = login(&users, &store, "user@test.com", "1234", SECRET).unwrap();
        let second = refresh(&users, &store, Some(&first.refresh_token), SECRET).unwrap();
        assert_ne!(first.refresh_token, second.refresh_token);
        assert_eq!(second.session.user.id, "2");

        assert!(matches!(
            refresh(&users, &store, Some(&first.refresh_token), SECRET),
            Err(AppError::Unauthorized(_))
        ));
        assert!(refresh(&users, &store, Some(&second.refresh_token), SECRET).is_ok());
    }

    #[test]
    fn refresh_without_credential_is_unauthorized() {
        let (users, store) = fixtures();
        assert!(matches!(
            refresh(&users, &store, None, SECRET),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            refresh(&users, &store, Some(""), SECRET),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn logout_revokes_credential() {
        let (users, store) = fixtures();
        let issued = login(&users, &store, "admin@test.com", "1234", SECRET).unwrap();
        logout(&store, Some(&issued.refresh_token));
        logout(&store, None);
        assert!(refresh(&users, &store, Some(&issued.refresh_token), SECRET).is_err());
    }

    #[test]
    fn current_user_for_vanished_account_is_unauthorized() {
        let (users, _) = fixtures();
        let claims = TokenClaims {
            sub: "99".into(),
            email: "gone@test.com".into(),
            role: Role::User,
            exp: 0,
            iat: 0,
        };
        assert!(matches!(
            current_user(&users, &claims),
            Err(AppError::Unauthorized(_))
        ));
    }
}
