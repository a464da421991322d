//! The auth gateway trait.
//!
//! The session controller never talks HTTP directly. It calls these four
//! operations and reacts to their results. Production code uses
//! [`HttpAuthGateway`](crate::HttpAuthGateway); tests script the results.

use std::future::Future;

use latchkey_protocol::{LoginRequest, LoginResponse, TokenResponse, User};

use crate::GatewayError;

/// The server-side session operations the controller depends on.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → the gateway is shared between the
///   controller's public methods and its scheduled renewal task.
/// - Each method returns a `Send` future so renewal can run on any
///   runtime worker.
///
/// Implementors can simply write `async fn`:
///
/// ```rust
/// use latchkey_gateway::{AuthGateway, GatewayError};
/// use latchkey_protocol::{LoginRequest, LoginResponse, TokenResponse, User};
///
/// /// Rejects everything. Handy for exercising the failure paths.
/// struct NoServer;
///
/// impl AuthGateway for NoServer {
///     async fn login(&self, _: &LoginRequest) -> Result<LoginResponse, GatewayError> {
///         Err(GatewayError::Unauthorized("no server".into()))
///     }
///     async fn logout(&self) -> Result<(), GatewayError> {
///         Ok(())
///     }
///     async fn refresh(&self) -> Result<TokenResponse, GatewayError> {
///         Err(GatewayError::Unauthorized("no session".into()))
///     }
///     async fn current_user(&self) -> Result<User, GatewayError> {
///         Err(GatewayError::Unauthorized("no session".into()))
///     }
/// }
/// ```
pub trait AuthGateway: Send + Sync + 'static {
    /// `POST /auth/login`. On success the server has also set the session
    /// and anti-forgery cookies.
    fn login(
        &self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<LoginResponse, GatewayError>> + Send;

    /// `POST /auth/logout`. Clears the server-side session cookie.
    fn logout(&self) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// `POST /auth/refresh`. Exchanges the session cookie for a new access
    /// token. Fails with [`GatewayError::Unauthorized`] when there is no
    /// valid session.
    fn refresh(&self) -> impl Future<Output = Result<TokenResponse, GatewayError>> + Send;

    /// `GET /auth/me`. Requires the bearer header.
    fn current_user(&self) -> impl Future<Output = Result<User, GatewayError>> + Send;
}
