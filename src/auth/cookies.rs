use actix_web::cookie::{time::Duration, Cookie, SameSite};

use super::session::SessionPolicy;

pub const STATE_COOKIE: &str = "oauth_state";
pub const ACCESS_COOKIE: &str = "auth_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Lifetime of the remembered oauth state.
const STATE_MAX_AGE: Duration = Duration::minutes(10);

/// Builds the session cookies. All are HttpOnly, `SameSite=Lax` and scoped to `/`.
#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    /// `false` only for plain-http local development.
    pub secure: bool,
    access_max_age: Duration,
    refresh_max_age: Duration,
}

impl CookiePolicy {
    pub fn new(secure: bool, session: SessionPolicy) -> Self {
        Self {
            secure,
            access_max_age: Duration::seconds(session.access_ttl.num_seconds()),
            refresh_max_age: Duration::seconds(session.refresh_ttl.num_seconds()),
        }
    }

    pub fn state(&self, value: String) -> Cookie<'static> {
        self.build(STATE_COOKIE, value, STATE_MAX_AGE)
    }

    pub fn access(&self, value: String) -> Cookie<'static> {
        self.build(ACCESS_COOKIE, value, self.access_max_age)
    }

    pub fn refresh(&self, value: String) -> Cookie<'static> {
        self.build(REFRESH_COOKIE, value, self.refresh_max_age)
    }

    /// Expired, empty cookie that makes the browser drop `name`.
    pub fn removal(&self, name: &'static str) -> Cookie<'static> {
        let mut cookie = self.build(name, String::new(), Duration::ZERO);
        cookie.make_removal();
        cookie
    }

    fn build(&self, name: &'static str, value: String, max_age: Duration) -> Cookie<'static> {
        Cookie::build(name, value)
            .path("/")
            .secure(self.secure)
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(max_age)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let policy = CookiePolicy::new(true, SessionPolicy::default());

        let access = policy.access("a".into());
        assert_eq!(access.name(), "auth_token");
        assert_eq!(access.max_age(), Some(Duration::seconds(900)));
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.secure(), Some(true));
        assert_eq!(access.same_site(), Some(SameSite::Lax));
        assert_eq!(access.path(), Some("/"));

        let refresh = policy.refresh("r".into());
        assert_eq!(refresh.max_age(), Some(Duration::days(7)));

        let state = policy.state("s".into());
        assert_eq!(state.name(), "oauth_state");
        assert_eq!(state.max_age(), Some(Duration::seconds(600)));
    }

    #[test]
    fn test_removal_cookie_expires_immediately() {
        let policy = CookiePolicy::new(false, SessionPolicy::default());
        let removal = policy.removal(REFRESH_COOKIE);
        assert_eq!(removal.value(), "");
        assert_eq!(removal.max_age(), Some(Duration::ZERO));
        assert_eq!(removal.secure(), Some(false));
        assert_eq!(removal.path(), Some("/"));
    }
}
