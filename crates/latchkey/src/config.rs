//! Controller configuration.

use std::time::Duration;

use latchkey_protocol::{CSRF_COOKIE, CSRF_HEADER};
use latchkey_timer::REFRESH_BUFFER;

/// Settings for a [`SessionController`](crate::SessionController).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long before expiry the access token is renewed.
    ///
    /// Default: 60 seconds. Tokens living this long or less are not
    /// renewed proactively.
    pub refresh_buffer: Duration,

    /// Name of the readable cookie holding the anti-forgery token.
    ///
    /// Default: `csrf_token`.
    pub csrf_cookie: String,

    /// Header the anti-forgery token is copied into.
    ///
    /// Default: `X-CSRF-Token`.
    pub csrf_header: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_buffer: REFRESH_BUFFER,
            csrf_cookie: CSRF_COOKIE.to_string(),
            csrf_header: CSRF_HEADER.to_string(),
        }
    }
}
