//! Business logic behind the auth handlers.

pub mod auth;
pub mod cookies;
pub mod refresh_store;
pub mod tokens;
pub mod users;
