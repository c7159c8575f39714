//! Session cookie data model produced by the federation exchange.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name of the primary session cookie, always present on success.
pub const FEDAUTH_COOKIE: &str = "FedAuth";

/// Name of the secondary long-lived cookie that extends the session beyond
/// the primary cookie's lifetime.
pub const RTFA_COOKIE: &str = "rtFA";

/// A single session cookie with the attributes the site expects back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Host of the target site
    pub domain: String,
    /// Always "/"
    pub path: String,
    /// Always true
    pub secure: bool,
    /// Always true
    pub http_only: bool,
    /// Expiry declared by the STS for the underlying token
    pub expires: DateTime<Utc>,
}

impl SessionCookie {
    pub(crate) fn session(
        name: &str,
        value: String,
        domain: &str,
        expires: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.to_string(),
            value,
            domain: domain.to_string(),
            path: "/".to_string(),
            secure: true,
            http_only: true,
            expires,
        }
    }

    /// Renders the cookie as a `name=value` pair for a `Cookie` header.
    pub fn pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// The cookie set obtained from one successful sign-in.
///
/// Contains the primary `FedAuth` cookie and, when requested, the secondary
/// `rtFA` cookie. Both expire when the underlying security token does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieSet {
    /// Primary session cookie
    pub fed_auth: SessionCookie,
    /// Secondary long-lived cookie, present iff requested and returned
    pub rtfa: Option<SessionCookie>,
    /// Expiry of the set, taken from the STS-declared token expiry
    pub expires: DateTime<Utc>,
}

impl CookieSet {
    pub(crate) fn new(fed_auth: SessionCookie, rtfa: Option<SessionCookie>) -> Self {
        let expires = fed_auth.expires;
        Self {
            fed_auth,
            rtfa,
            expires,
        }
    }

    /// When this set stops being served from the cache.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires
    }

    /// Whether the set is still usable at `now`.
    ///
    /// Expiry is inclusive: a set is stale at exactly its expiry instant,
    /// not one tick after.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires
    }

    /// Cookies in the set, primary first.
    pub fn cookies(&self) -> impl Iterator<Item = &SessionCookie> {
        std::iter::once(&self.fed_auth).chain(self.rtfa.as_ref())
    }

    /// Renders the set as a `Cookie` request-header value.
    pub fn header_value(&self) -> String {
        self.cookies()
            .map(SessionCookie::pair)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cookie(name: &str, value: &str) -> SessionCookie {
        SessionCookie::session(
            name,
            value.to_string(),
            "tenant.example",
            Utc.with_ymd_and_hms(2026, 8, 4, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_session_cookie_attributes() {
        let c = cookie(FEDAUTH_COOKIE, "abc123");

        assert_eq!(c.path, "/");
        assert!(c.secure);
        assert!(c.http_only);
        assert_eq!(c.domain, "tenant.example");
        assert_eq!(c.pair(), "FedAuth=abc123");
    }

    #[test]
    fn test_header_value_orders_primary_first() {
        let set = CookieSet::new(
            cookie(FEDAUTH_COOKIE, "abc123"),
            Some(cookie(RTFA_COOKIE, "def456")),
        );

        assert_eq!(set.header_value(), "FedAuth=abc123; rtFA=def456");
    }

    #[test]
    fn test_header_value_without_rtfa() {
        let set = CookieSet::new(cookie(FEDAUTH_COOKIE, "abc123"), None);

        assert_eq!(set.header_value(), "FedAuth=abc123");
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let set = CookieSet::new(cookie(FEDAUTH_COOKIE, "abc123"), None);
        let expires = set.expires_at();

        assert!(set.is_valid_at(expires - chrono::Duration::seconds(1)));
        assert!(!set.is_valid_at(expires));
        assert!(!set.is_valid_at(expires + chrono::Duration::seconds(1)));
    }
}
