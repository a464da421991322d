//! Cookie access.
//!
//! The client never stores cookies itself; the server owns them. Code that
//! needs a cookie value asks a [`CookieSource`] for the current
//! `Cookie:`-style string (`"a=1; csrf_token=xyz"`) and parses what it
//! needs out of it with [`parse_cookie`].

use std::sync::Arc;

use reqwest::Url;
use reqwest::cookie::{CookieStore, Jar};

/// Somewhere cookie values can be read from, at call time.
///
/// Implementations must return the *current* cookies on every call. The
/// server may rotate a cookie between two requests and callers rely on
/// seeing the new value immediately.
///
/// Any `Fn() -> Option<String>` closure is a `CookieSource`, which keeps
/// tests short:
///
/// ```rust
/// use latchkey_request::CookieSource;
///
/// let source = || Some("csrf_token=abc".to_string());
/// assert_eq!(source.cookie_header().as_deref(), Some("csrf_token=abc"));
/// ```
pub trait CookieSource: Send + Sync + 'static {
    /// Returns the cookie string for the application's origin, or `None`
    /// if there are no cookies.
    fn cookie_header(&self) -> Option<String>;
}

impl<F> CookieSource for F
where
    F: Fn() -> Option<String> + Send + Sync + 'static,
{
    fn cookie_header(&self) -> Option<String> {
        self()
    }
}

/// Reads cookies from a reqwest cookie jar for one origin.
///
/// This is the production source: the same jar is installed into the HTTP
/// client, so cookies the server sets on responses (including rotations)
/// show up here on the next read.
#[derive(Clone)]
pub struct JarCookies {
    jar: Arc<Jar>,
    url: Url,
}

impl std::fmt::Debug for JarCookies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JarCookies").field("url", &self.url.as_str()).finish()
    }
}

impl JarCookies {
    /// Creates a source reading `jar` as seen by requests to `url`.
    pub fn new(jar: Arc<Jar>, url: Url) -> Self {
        Self { jar, url }
    }
}

impl CookieSource for JarCookies {
    fn cookie_header(&self) -> Option<String> {
        let value = self.jar.cookies(&self.url)?;
        value.to_str().ok().map(str::to_owned)
    }
}

/// Extracts the value of cookie `name` from a `Cookie:`-style string.
///
/// Pairs are separated by `;`, whitespace around pairs is ignored and the
/// value is everything after the first `=`. An empty value counts as
/// absent. Values are returned as-is (no percent-decoding).
pub fn parse_cookie(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}
