//! Anti-forgery token bridge: cookie in, header out.
//!
//! The server sets a readable `csrf_token` cookie and expects the same
//! value echoed back in `X-CSRF-Token`. The bridge performs that copy on
//! every request. It deliberately keeps no copy of the token: the server
//! may rotate the cookie at any time, and the next request must carry the
//! new value.

use std::fmt;
use std::sync::Arc;

use latchkey_protocol::CSRF_COOKIE;
use reqwest::header::{HeaderName, HeaderValue};

use crate::{CookieSource, Interceptor, RequestMetadata, parse_cookie};

/// Copies the anti-forgery cookie into a request header.
///
/// Install it once per pipeline with
/// [`RequestPipeline::register`](crate::RequestPipeline::register); it then
/// applies to every request, including ones issued by code that knows
/// nothing about sessions.
#[derive(Clone)]
pub struct ForgeryTokenBridge {
    source: Arc<dyn CookieSource>,
    cookie_name: String,
    header_name: HeaderName,
}

impl ForgeryTokenBridge {
    /// A bridge reading `csrf_token` into `X-CSRF-Token`.
    ///
    /// `HeaderName` stores names lowercased; on the wire this is the same
    /// header as `X-CSRF-Token`.
    pub fn new(source: Arc<dyn CookieSource>) -> Self {
        Self {
            source,
            cookie_name: CSRF_COOKIE.to_owned(),
            header_name: HeaderName::from_static("x-csrf-token"),
        }
    }

    /// A bridge with custom cookie and header names.
    pub fn with_names(
        source: Arc<dyn CookieSource>,
        cookie_name: impl Into<String>,
        header_name: HeaderName,
    ) -> Self {
        Self {
            source,
            cookie_name: cookie_name.into(),
            header_name,
        }
    }

    /// Reads the token from the cookie source right now.
    pub fn current_token(&self) -> Option<String> {
        let header = self.source.cookie_header()?;
        parse_cookie(&header, &self.cookie_name)
    }

    /// Returns `request` with the token header set, or unchanged when
    /// there is no token.
    ///
    /// A cookie value that isn't a legal header value is skipped with a
    /// warning rather than failing the request.
    pub fn augment(&self, mut request: RequestMetadata) -> RequestMetadata {
        let Some(token) = self.current_token() else {
            return request;
        };
        match HeaderValue::from_str(&token) {
            Ok(value) => {
                request.headers.insert(self.header_name.clone(), value);
            }
            Err(_) => {
                tracing::warn!(
                    cookie = %self.cookie_name,
                    "anti-forgery cookie is not a valid header value, not forwarded"
                );
            }
        }
        request
    }

    /// The header this bridge writes.
    pub fn header_name(&self) -> &HeaderName {
        &self.header_name
    }
}

impl Interceptor for ForgeryTokenBridge {
    fn intercept(&self, request: RequestMetadata) -> RequestMetadata {
        self.augment(request)
    }
}

impl fmt::Debug for ForgeryTokenBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForgeryTokenBridge")
            .field("cookie_name", &self.cookie_name)
            .field("header_name", &self.header_name)
            .finish_non_exhaustive()
    }
}
