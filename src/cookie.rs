//! Cookie transport primitives
//!
//! The session manager reads the session cookie through [`CookieSource`] and
//! emits `Set-Cookie` values through [`CookieSink`]. Web frameworks implement
//! the two traits over their own request/response types; [`RequestCookies`]
//! and [`ResponseCookies`] cover plain header strings.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;

/// An outgoing cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: Option<String>,
    pub http_only: bool,
    /// Seconds until expiry; negative deletes the cookie immediately
    pub max_age: Option<i64>,
    pub expires: Option<DateTime<Utc>>,
}

impl Cookie {
    /// Create a bare cookie with no attributes
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: None,
            http_only: false,
            max_age: None,
            expires: None,
        }
    }

    /// Cookie carrying a live session: `Path=/`, `HttpOnly`, `Max-Age`
    pub fn session(name: impl Into<String>, value: impl Into<String>, max_age_secs: i64) -> Self {
        Self {
            path: Some("/".to_string()),
            http_only: true,
            max_age: Some(max_age_secs),
            ..Self::new(name, value)
        }
    }

    /// Empty cookie instructing the client to drop `name` right away
    pub fn expired(name: impl Into<String>) -> Self {
        Self {
            path: Some("/".to_string()),
            http_only: true,
            max_age: Some(-1),
            expires: Some(Utc::now()),
            ..Self::new(name, "")
        }
    }

    /// Whether this cookie removes itself on the client
    pub fn is_removal(&self) -> bool {
        self.max_age.is_some_and(|age| age < 0)
    }

    /// Render as a `Set-Cookie` header value
    pub fn to_header_value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if let Some(path) = &self.path {
            write!(f, "; Path={}", path)?;
        }
        if let Some(expires) = &self.expires {
            write!(f, "; Expires={}", expires.format("%a, %d %b %Y %H:%M:%S GMT"))?;
        }
        if let Some(age) = self.max_age {
            // Browsers only understand Max-Age=0 as "delete now".
            write!(f, "; Max-Age={}", age.max(0))?;
        }
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        Ok(())
    }
}

/// Request side: cookies presented by the client
pub trait CookieSource {
    /// Value of the cookie called `name`, if the client sent one
    fn cookie(&self, name: &str) -> Option<&str>;
}

/// Response side: cookies to send back to the client
pub trait CookieSink {
    /// Queue `cookie` for the response
    fn set_cookie(&mut self, cookie: Cookie);
}

/// Cookies parsed from a request `Cookie` header
#[derive(Debug, Clone, Default)]
pub struct RequestCookies {
    values: HashMap<String, String>,
}

impl RequestCookies {
    /// No cookies
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `Cookie:` header value (`a=1; b=2`)
    ///
    /// Pairs without `=` are ignored; the first occurrence of a name wins.
    pub fn parse(header: &str) -> Self {
        let mut values = HashMap::new();
        for pair in header.split(';') {
            if let Some((name, value)) = pair.split_once('=') {
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                values
                    .entry(name.to_string())
                    .or_insert_with(|| value.trim().trim_matches('"').to_string());
            }
        }
        Self { values }
    }

    /// Add or replace a cookie
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl CookieSource for RequestCookies {
    fn cookie(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Cookies collected for a response
#[derive(Debug, Clone, Default)]
pub struct ResponseCookies {
    cookies: Vec<Cookie>,
}

impl ResponseCookies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cookies in the order they were set
    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    /// Last cookie set under `name`
    pub fn get(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().rev().find(|c| c.name == name)
    }

    /// `Set-Cookie` header values
    pub fn header_values(&self) -> Vec<String> {
        self.cookies.iter().map(Cookie::to_header_value).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

impl CookieSink for ResponseCookies {
    fn set_cookie(&mut self, cookie: Cookie) {
        self.cookies.push(cookie);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn session_cookie_header() {
        let cookie = Cookie::session("sid", "abc%3D", 3600);
        assert_eq!(
            cookie.to_header_value(),
            "sid=abc%3D; Path=/; Max-Age=3600; HttpOnly"
        );
        assert!(!cookie.is_removal());
    }

    #[test]
    fn expired_cookie_header() {
        let mut cookie = Cookie::expired("sid");
        cookie.expires = Some(Utc.with_ymd_and_hms(2024, 3, 9, 8, 5, 1).unwrap());

        assert!(cookie.is_removal());
        assert_eq!(
            cookie.to_header_value(),
            "sid=; Path=/; Expires=Sat, 09 Mar 2024 08:05:01 GMT; Max-Age=0; HttpOnly"
        );
    }

    #[test]
    fn parse_request_header() {
        let cookies = RequestCookies::parse("theme=dark; sid=abc%3D ; junk; sid=second; q=\"x\"");
        assert_eq!(cookies.cookie("sid"), Some("abc%3D"));
        assert_eq!(cookies.cookie("theme"), Some("dark"));
        assert_eq!(cookies.cookie("q"), Some("x"));
        assert_eq!(cookies.cookie("junk"), None);
    }

    #[test]
    fn response_keeps_last_cookie_per_name() {
        let mut response = ResponseCookies::new();
        response.set_cookie(Cookie::session("sid", "one", 10));
        response.set_cookie(Cookie::expired("sid"));

        assert_eq!(response.cookies().len(), 2);
        assert!(response.get("sid").unwrap().is_removal());
        assert_eq!(response.header_values().len(), 2);
    }
}
