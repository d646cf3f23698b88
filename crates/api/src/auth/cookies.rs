//! Session cookies.
//!
//! All cookies are `HttpOnly`, `SameSite=Lax` and scoped to `/`. `Secure` is
//! set when [`CookieConfig::secure`] is on (any HTTPS deployment).

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::auth::jwt::JwtConfig;

/// Carries the access JWT.
pub const SESSION_COOKIE: &str = "qt_session";
/// Carries the opaque refresh token.
pub const REFRESH_COOKIE: &str = "qt_refresh";
/// Carries `<provider>:<state>` between OAuth start and callback.
pub const OAUTH_STATE_COOKIE: &str = "qt_oauth_state";

/// Lifetime of the OAuth state cookie.
const OAUTH_STATE_MINUTES: i64 = 10;

#[derive(Debug, Clone, Default)]
pub struct CookieConfig {
    /// Mark cookies `Secure` (HTTPS only).
    pub secure: bool,
}

impl CookieConfig {
    fn build(&self, name: &'static str, value: String, max_age: time::Duration) -> Cookie<'static> {
        Cookie::build((name, value))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .path("/")
            .max_age(max_age)
            .build()
    }

    pub fn session(&self, access_token: String, jwt: &JwtConfig) -> Cookie<'static> {
        self.build(
            SESSION_COOKIE,
            access_token,
            time::Duration::minutes(jwt.access_token_expiry_mins),
        )
    }

    pub fn refresh(&self, refresh_token: String, jwt: &JwtConfig) -> Cookie<'static> {
        self.build(
            REFRESH_COOKIE,
            refresh_token,
            time::Duration::days(jwt.refresh_token_expiry_days),
        )
    }

    pub fn oauth_state(&self, value: String) -> Cookie<'static> {
        self.build(
            OAUTH_STATE_COOKIE,
            value,
            time::Duration::minutes(OAUTH_STATE_MINUTES),
        )
    }
}

/// A removal cookie matching the path the cookie was set with.
pub fn removal(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, "")).path("/").build()
}

/// Drop both session cookies from the jar.
pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(removal(SESSION_COOKIE))
        .remove(removal(REFRESH_COOKIE))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt() -> JwtConfig {
        JwtConfig {
            secret: "s".into(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 30,
        }
    }

    #[test]
    fn session_cookie_attributes() {
        let cookie = CookieConfig { secure: true }.session("tok".into(), &jwt());
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::minutes(15)));
    }

    #[test]
    fn refresh_cookie_lives_for_refresh_expiry() {
        let cookie = CookieConfig::default().refresh("r".into(), &jwt());
        assert_eq!(cookie.max_age(), Some(time::Duration::days(30)));
        assert_eq!(cookie.secure(), Some(false));
    }

    #[test]
    fn clearing_emits_expired_cookies() {
        let jar = CookieJar::new()
            .add(Cookie::new(SESSION_COOKIE, "a"))
            .add(Cookie::new(REFRESH_COOKIE, "b"));
        let jar = clear_session(jar);
        assert!(jar.get(SESSION_COOKIE).is_none());
        assert!(jar.get(REFRESH_COOKIE).is_none());
    }
}
