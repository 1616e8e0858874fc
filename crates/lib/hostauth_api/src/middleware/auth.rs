//! Access-token guard for protected routes.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::AppState;
use crate::error::AppError;
use crate::services::tokens::{TokenClaims, verify_access_token};

/// Claims of the verified access token, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub TokenClaims);

/// The token from `Authorization: Bearer <token>`, if present and well formed.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Rejects requests without a valid access token with 401, which clients
/// answer by refreshing. Expired and malformed tokens get distinct messages.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| AppError::Unauthorized("Authentication required".into()))?;

    let claims = verify_access_token(token, state.config.jwt_secret.as_bytes()).map_err(|e| {
        debug!(path = %request.uri().path(), reason = %e, "access token refused");
        AppError::Unauthorized(e.to_string())
    })?;

    request.extensions_mut().insert(AuthenticatedUser(claims));
    Ok(next.run(request).await)
}
