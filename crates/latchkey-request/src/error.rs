//! Error types for the request layer.

/// Errors that can occur while shaping outgoing request metadata.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// A header value contained bytes that are not allowed in HTTP headers
    /// (control characters, newlines).
    ///
    /// The value itself is never included: it may be a credential.
    #[error("invalid value for header {0}")]
    InvalidHeaderValue(String),

    /// A configured header name isn't a valid HTTP token.
    #[error("invalid header name {0:?}")]
    InvalidHeaderName(String),
}
