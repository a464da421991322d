//! Error types for the session controller.

use std::sync::Arc;

use latchkey_gateway::GatewayError;
use latchkey_request::RequestError;

/// Errors surfaced by [`SessionController`](crate::SessionController)
/// operations that report failure to their caller (`login`,
/// `refresh_now`, `reload_user`, construction).
///
/// Bootstrap and scheduled renewal never return these; they resolve into
/// a clean unauthenticated state instead.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The server rejected the username/password. Carries the server's
    /// message verbatim for display.
    #[error("{0}")]
    InvalidCredentials(String),

    /// There is no long-lived session to mint a token from (first visit,
    /// or the session cookie expired). Local state has been cleared.
    #[error("no active session")]
    NoSession,

    /// Renewing the access token failed for a reason other than a missing
    /// session. Local state has been cleared.
    ///
    /// Shared between every caller that awaited the same refresh, hence
    /// the `Arc`.
    #[error("session renewal failed: {0}")]
    RenewalFailed(Arc<GatewayError>),

    /// `GET /auth/me` failed.
    #[error("user profile unavailable: {0}")]
    ProfileUnavailable(#[source] GatewayError),

    /// Any other gateway failure (network, server error, ...).
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Invalid request configuration (e.g. a bad anti-forgery header name).
    #[error(transparent)]
    Request(#[from] RequestError),

    /// A login, logout or shutdown happened while this operation was in
    /// flight; its result was discarded.
    #[error("superseded by a newer login or logout")]
    Superseded,

    /// [`shutdown`](crate::SessionController::shutdown) was called.
    #[error("session controller has shut down")]
    ShutDown,
}
