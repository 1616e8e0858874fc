//! Authentication request handlers.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::{Extension, Json};
use axum_extra::extract::cookie::CookieJar;
use hostauth_core::models::auth::{AuthSession, LoginRequest, UserPayload};
use hostauth_core::models::{Envelope, MessageBody};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::services::auth;
use crate::services::cookies::{REFRESH_COOKIE, clear_refresh_cookie, refresh_cookie};

/// `POST /api/auth/login` — authenticate with email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<(CookieJar, Json<Envelope<AuthSession>>)> {
    let Json(body) = body.map_err(|e| AppError::Validation(e.body_text()))?;
    let issued = auth::login(
        &state.users,
        &state.refresh_tokens,
        &body.email,
        &body.password,
        state.config.jwt_secret.as_bytes(),
    )?;
    let jar = jar.add(refresh_cookie(
        &issued.refresh_token,
        state.config.cookie_secure,
    ));
    Ok((jar, Json(Envelope::ok(issued.session))))
}

/// `POST /api/auth/refresh` — rotate the refresh cookie and mint a new access token.
pub async fn refresh_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<Envelope<AuthSession>>)> {
    let presented = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string());
    let issued = auth::refresh(
        &state.users,
        &state.refresh_tokens,
        presented.as_deref(),
        state.config.jwt_secret.as_bytes(),
    )?;
    let jar = jar.add(refresh_cookie(
        &issued.refresh_token,
        state.config.cookie_secure,
    ));
    Ok((jar, Json(Envelope::ok(issued.session))))
}

/// `POST /api/auth/logout` — revoke and clear the refresh cookie. Always succeeds.
pub async fn logout_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageBody>) {
    let presented = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string());
    auth::logout(&state.refresh_tokens, presented.as_deref());
    let jar = jar.add(clear_refresh_cookie(state.config.cookie_secure));
    (
        jar,
        Json(MessageBody {
            status_code: 200,
            message: "Logged out successfully".into(),
        }),
    )
}

/// `GET /api/auth/me` — the user behind the bearer token.
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
) -> AppResult<Json<Envelope<UserPayload>>> {
    let user = auth::current_user(&state.users, &claims)?;
    Ok(Json(Envelope::ok(UserPayload { user })))
}
