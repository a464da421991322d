//! The boundary between latchkey and the server.
//!
//! - [`AuthGateway`]: the four `/auth` operations the session controller
//!   needs (login, logout, refresh, current user), as a trait so the
//!   controller can be driven by a fake in tests.
//! - [`ApiClient`]: a reqwest client with a cookie jar and a
//!   [`RequestPipeline`](latchkey_request::RequestPipeline). Every request
//!   it sends, auth or not, is shaped by the pipeline first.
//! - [`HttpAuthGateway`]: the production [`AuthGateway`] over an
//!   [`ApiClient`], plus the profile/password endpoints other modules use.
//! - [`GatewayError`]: what can go wrong talking to the server.

mod client;
mod error;
mod gateway;
mod http;

pub use client::{ApiClient, GatewayConfig};
pub use error::GatewayError;
pub use gateway::AuthGateway;
pub use http::HttpAuthGateway;
