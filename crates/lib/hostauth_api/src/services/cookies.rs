//! Refresh credential cookie.
//!
//! The credential lives only in an HTTP-only cookie; it never appears in a
//! response body.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use super::tokens::REFRESH_TOKEN_EXPIRY_DAYS;

/// Cookie name for the refresh credential.
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Build the HTTP-only refresh cookie (7 days).
pub fn refresh_cookie(token: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE.to_string(), token.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/".to_string())
        .max_age(Duration::days(REFRESH_TOKEN_EXPIRY_DAYS))
        .build()
}

/// Build an expired refresh cookie to clear the credential.
pub fn clear_refresh_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE.to_string(), String::new()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/".to_string())
        .max_age(Duration::ZERO)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_cookie_attributes() {
        let cookie = refresh_cookie("abc", false);
        assert_eq!(cookie.name(), REFRESH_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(604_800)));
        assert_ne!(cookie.secure(), Some(true));
    }

    #[test]
    fn secure_flag_follows_config() {
        assert_eq!(refresh_cookie("abc", true).secure(), Some(true));
    }

    #[test]
    fn clearing_cookie_expires_immediately() {
        let cookie = clear_refresh_cookie(false);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }
}
