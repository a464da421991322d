//! Error types for the gateway layer.

use reqwest::StatusCode;

/// Errors returned by gateway operations.
///
/// Status-derived variants carry the server's message (truncated), which
/// is what a login form shows the user.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// 401: bad credentials, or no valid session cookie on refresh.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// 403: typically a missing or stale anti-forgery token.
    #[error("access denied: {0}")]
    Forbidden(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("rate limited - please wait before retrying")]
    RateLimited,

    #[error("server error: {0}")]
    Server(String),

    /// The request never got a response (DNS, connect, timeout, TLS).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The configured base URL or a request path didn't form a valid URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The response arrived but wasn't what the contract says.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for response bodies quoted in error messages.
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl GatewayError {
    /// Maps a non-success status and its body to an error.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = Self::message_from_body(body);
        match status.as_u16() {
            401 => GatewayError::Unauthorized(message),
            403 => GatewayError::Forbidden(message),
            404 => GatewayError::NotFound(message),
            429 => GatewayError::RateLimited,
            500..=599 => GatewayError::Server(message),
            _ => GatewayError::InvalidResponse(format!("status {status}: {message}")),
        }
    }

    /// `true` for 401 responses.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, GatewayError::Unauthorized(_))
    }

    /// Pulls a human-readable message out of an error body.
    ///
    /// JSON bodies of the form `{"detail": "..."}` or `{"message": "..."}`
    /// yield the inner string; anything else is used verbatim.
    fn message_from_body(body: &str) -> String {
        let extracted = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                ["detail", "message", "error"]
                    .iter()
                    .find_map(|key| v.get(key).and_then(|m| m.as_str()).map(str::to_owned))
            });
        Self::truncate_body(extracted.as_deref().unwrap_or(body))
    }

    /// Truncate a response body to avoid logging excessive data.
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }
}
