//! Session cookie transport.
//!
//! Both tokens travel as `HttpOnly` cookies. Their `Max-Age` is a client-side
//! hint only and is independent of the expiry embedded in each token.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use quill_auth::TokenPair;
use quill_core::config::AuthConfig;

/// Cookie carrying the access token.
pub const ACCESS_COOKIE: &str = "accessToken";
/// Cookie carrying the refresh token.
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Attributes shared by both session cookies.
#[derive(Debug, Clone, Copy)]
pub struct CookieSettings {
    /// Client-side lifetime.
    pub max_age: time::Duration,
    /// Whether to set `Secure`.
    pub secure: bool,
}

impl CookieSettings {
    /// Reads cookie attributes from auth configuration.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            max_age: time::Duration::hours(config.cookie_max_age_hours as i64),
            secure: config.cookie_secure,
        }
    }

    fn build(&self, name: &'static str, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .http_only(true)
            .path("/")
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(self.max_age)
            .build()
    }
}

/// Adds both session cookies for a freshly minted pair.
pub fn set_session_cookies(
    jar: CookieJar,
    tokens: &TokenPair,
    settings: &CookieSettings,
) -> CookieJar {
    jar.add(settings.build(ACCESS_COOKIE, tokens.access.token.clone()))
        .add(settings.build(REFRESH_COOKIE, tokens.refresh.token.clone()))
}

/// Instructs the client to drop both session cookies.
pub fn clear_session_cookies(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(ACCESS_COOKIE).path("/"))
        .remove(Cookie::build(REFRESH_COOKIE).path("/"))
}

/// The access token cookie value, if present and non-empty.
pub fn access_token(jar: &CookieJar) -> Option<&str> {
    cookie_value(jar, ACCESS_COOKIE)
}

/// The refresh token cookie value, if present and non-empty.
pub fn refresh_token(jar: &CookieJar) -> Option<&str> {
    cookie_value(jar, REFRESH_COOKIE)
}

fn cookie_value<'a>(jar: &'a CookieJar, name: &str) -> Option<&'a str> {
    jar.get(name)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
}
