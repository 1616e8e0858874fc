//! # hostauth_api
//!
//! Auth API serving login, refresh-cookie rotation, logout and the current
//! user. The session client in `hostauth_client` talks to this contract.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderName, Method, header};
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::ApiConfig;
use crate::error::AppResult;
use crate::handlers::auth;
use crate::services::refresh_store::RefreshTokenStore;
use crate::services::users::UserDirectory;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: ApiConfig,
    /// Registered users.
    pub users: Arc<UserDirectory>,
    /// Live refresh credentials.
    pub refresh_tokens: Arc<RefreshTokenStore>,
}

impl AppState {
    /// State with the seeded user directory and an empty refresh store.
    pub fn new(config: ApiConfig) -> AppResult<Self> {
        let users = UserDirectory::seeded(config.bcrypt_cost)?;
        Ok(Self {
            config,
            users: Arc::new(users),
            refresh_tokens: Arc::new(RefreshTokenStore::new()),
        })
    }
}

/// Correlation header sent by clients on every request.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    // Credentialed CORS cannot use a wildcard origin.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ]);

    // Public routes (no auth required)
    let public = Router::new()
        .route(routes::POST_AUTH_LOGIN, post(auth::login_handler))
        .route(routes::POST_AUTH_REFRESH, post(auth::refresh_handler))
        .route(routes::POST_AUTH_LOGOUT, post(auth::logout_handler));

    // Protected routes (require auth)
    let protected = Router::new()
        .route(routes::GET_AUTH_ME, get(auth::me_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(cors)
        .with_state(state)
}
