//! Cookie transport for session tokens.
//!
//! The cookie only carries the raw token; nothing here validates it. Pass what
//! [`CookieTransport::get`] returns to
//! [`SessionService::verify`](crate::SessionService::verify).

use time::Duration;
use tower_sessions::cookie::{Cookie, CookieJar, SameSite};

use crate::config::SessionConfig;
use crate::token::Token;

/// Reads, writes and clears the session token on the client channel.
pub trait CookieTransport {
    /// Stores `token` in the cookie with the session attributes.
    fn set(&mut self, token: &Token);

    /// The presented token, or `None` when the cookie is missing or empty.
    fn get(&self) -> Option<Token>;

    /// Expires the cookie on the client.
    fn clear(&mut self);
}

/// [`CookieTransport`] over a [`CookieJar`] for a single request/response.
///
/// Seed it from the request's `Cookie` header, then write
/// [`set_cookie_headers`](Self::set_cookie_headers) to the response.
///
/// ```
/// use seaorm_session_auth::{CookieTransport, SessionConfig, SessionCookies};
///
/// let config = SessionConfig::default();
/// let mut cookies = SessionCookies::from_header(&config, Some("SESSION_ID=abc; theme=dark"));
/// assert_eq!(cookies.get().unwrap().as_str(), "abc");
///
/// cookies.clear();
/// assert!(cookies.get().is_none());
/// assert_eq!(cookies.set_cookie_headers().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SessionCookies {
    jar: CookieJar,
    name: String,
    max_age: Duration,
    secure: bool,
}

impl SessionCookies {
    /// An empty transport, for responses to requests that carried no cookies.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            jar: CookieJar::new(),
            name: config.cookie_name.clone(),
            max_age: config.ttl.max(Duration::ZERO),
            secure: config.secure,
        }
    }

    /// Builds the transport from a raw `Cookie` request header. Unparseable
    /// pairs are skipped.
    pub fn from_header(config: &SessionConfig, cookie_header: Option<&str>) -> Self {
        let mut cookies = Self::new(config);
        if let Some(header) = cookie_header {
            for cookie in Cookie::split_parse(header.to_owned()).flatten() {
                cookies.jar.add_original(cookie);
            }
        }
        cookies
    }

    /// `Set-Cookie` header values for every change made through this transport.
    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.jar.delta().map(|cookie| cookie.to_string()).collect()
    }

    fn session_cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build((self.name.clone(), value))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(self.max_age)
            .path("/")
            .build()
    }
}

impl CookieTransport for SessionCookies {
    fn set(&mut self, token: &Token) {
        let cookie = self.session_cookie(token.as_str().to_owned());
        self.jar.add(cookie);
    }

    fn get(&self) -> Option<Token> {
        self.jar
            .get(&self.name)
            .map(|cookie| cookie.value())
            .filter(|value| !value.is_empty())
            .map(Token::from)
    }

    fn clear(&mut self) {
        // Always emit a tombstone, even if the client sent no cookie.
        let mut removal = self.session_cookie(String::new());
        removal.make_removal();
        self.jar.add(removal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> Token {
        Token::from("ab".repeat(32))
    }

    #[test]
    fn set_emits_hardened_cookie() {
        let mut cookies = SessionCookies::new(&SessionConfig::default());
        cookies.set(&token());

        let headers = cookies.set_cookie_headers();
        assert_eq!(headers.len(), 1);
        let header = &headers[0];
        assert!(header.starts_with(&format!("SESSION_ID={}", token().as_str())));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("SameSite=Lax"));
        assert!(header.contains("Path=/"));
        assert!(header.contains("Max-Age=2592000"));
        assert!(!header.contains("Secure"));
    }

    #[test]
    fn secure_flag_follows_config() {
        let config = SessionConfig::default().with_secure(true);
        let mut cookies = SessionCookies::new(&config);
        cookies.set(&token());

        assert!(cookies.set_cookie_headers()[0].contains("Secure"));
    }

    #[test]
    fn negative_ttl_never_yields_negative_max_age() {
        let config = SessionConfig::default().with_ttl(Duration::seconds(-30));
        let mut cookies = SessionCookies::new(&config);
        cookies.set(&token());

        let header = &cookies.set_cookie_headers()[0];
        assert!(header.contains("Max-Age=0"));
        assert!(!header.contains("Max-Age=-"));
    }

    #[test]
    fn get_reads_configured_name_only() {
        let config = SessionConfig::default().with_cookie_name("sid");
        let header = Some("SESSION_ID=wrong; sid=right");

        let cookies = SessionCookies::from_header(&config, header);
        assert_eq!(cookies.get(), Some(Token::from("right")));
    }

    #[test]
    fn missing_or_empty_cookie_is_absent() {
        let config = SessionConfig::default();
        assert_eq!(SessionCookies::from_header(&config, None).get(), None);
        assert_eq!(
            SessionCookies::from_header(&config, Some("SESSION_ID=")).get(),
            None
        );
        assert_eq!(
            SessionCookies::from_header(&config, Some("other=1")).get(),
            None
        );
    }

    #[test]
    fn set_then_get_round_trips_within_request() {
        let mut cookies = SessionCookies::new(&SessionConfig::default());
        cookies.set(&token());
        assert_eq!(cookies.get(), Some(token()));
    }

    #[test]
    fn clear_emits_expiring_cookie() {
        let config = SessionConfig::default();
        let mut cookies = SessionCookies::from_header(&config, Some("SESSION_ID=abc"));
        cookies.clear();

        assert_eq!(cookies.get(), None);
        let headers = cookies.set_cookie_headers();
        assert_eq!(headers.len(), 1);
        assert!(headers[0].starts_with("SESSION_ID=;"));
        assert!(headers[0].contains("Max-Age=0"));
        assert!(headers[0].contains("Path=/"));
    }
}
