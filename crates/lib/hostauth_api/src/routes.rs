//! Route paths served by the API.

pub const POST_AUTH_LOGIN: &str = "/api/auth/login";
pub const POST_AUTH_REFRESH: &str = "/api/auth/refresh";
pub const POST_AUTH_LOGOUT: &str = "/api/auth/logout";
pub const GET_AUTH_ME: &str = "/api/auth/me";
