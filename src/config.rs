//! Session settings passed to [`SessionService`](crate::SessionService) at construction.

use std::env;

use time::Duration;

/// Default name of the cookie carrying the session token.
pub const DEFAULT_COOKIE_NAME: &str = "SESSION_ID";

/// Fixed session lifetime: 30 days from issuance.
pub const DEFAULT_TTL: Duration = Duration::days(30);

/// Cookie and lifetime settings for issued sessions.
///
/// # Examples
///
/// ```
/// use seaorm_session_auth::SessionConfig;
///
/// let config = SessionConfig::default()
///     .with_cookie_name("app_session")
///     .with_secure(true);
///
/// assert_eq!(config.cookie_name, "app_session");
/// assert_eq!(config.ttl_seconds(), 2_592_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Name of the cookie holding the raw token.
    pub cookie_name: String,
    /// Time between issuance and expiry.
    pub ttl: Duration,
    /// Whether the cookie is restricted to encrypted transport.
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            ttl: DEFAULT_TTL,
            secure: false,
        }
    }
}

impl SessionConfig {
    /// Builds a configuration from the process environment.
    ///
    /// * `SESSION_COOKIE_NAME` overrides the cookie name; blank values are ignored.
    /// * `APP_ENV=production` marks the cookie `Secure`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(name) = env::var("SESSION_COOKIE_NAME") {
            let name = name.trim();
            if !name.is_empty() {
                config.cookie_name = name.to_string();
            }
        }

        config.secure = env::var("APP_ENV")
            .map(|value| value.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        config
    }

    /// Sets the name of the session cookie.
    pub fn with_cookie_name(mut self, cookie_name: impl Into<String>) -> Self {
        self.cookie_name = cookie_name.into();
        self
    }

    /// Sets the session lifetime.
    ///
    /// Not validated here: a TTL that is not positive, or that overflows the
    /// clock, makes [`SessionService::create`](crate::SessionService::create)
    /// fail with [`Error::InvalidTtl`](crate::Error::InvalidTtl).
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Marks the cookie `Secure` (HTTPS only).
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Session lifetime in whole seconds, as used for the cookie `Max-Age`.
    /// Never negative.
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.whole_seconds().max(0)
    }
}
