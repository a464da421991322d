//! # Latchkey
//!
//! Client-side session and credential lifecycle manager.
//!
//! Latchkey holds a short-lived access token in memory only, renews it a
//! minute before it expires, mirrors it into every outgoing request's
//! `Authorization` header, copies the server's anti-forgery cookie into
//! `X-CSRF-Token`, and restores the session from the server's long-lived
//! HttpOnly cookie on start.
//!
//! The application talks to one type, [`SessionController`]. Everything
//! else (the store, the scheduler, the request pipeline) is composed
//! inside it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use latchkey::prelude::*;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(ApiClient::new(GatewayConfig::with_base_url(
//!     "https://crm.example.com/api/",
//! ))?);
//! let session = SessionController::over_http(
//!     HttpAuthGateway::new(Arc::clone(&client)),
//!     TokioTimer,
//!     SessionConfig::default(),
//! )?;
//!
//! if !session.bootstrap().await {
//!     session.login(&LoginRequest::new("ada", "correct horse")).await?;
//! }
//!
//! // Every request through `client` now carries the bearer and CSRF headers.
//! let customers: serde_json::Value = client.get_json("/customers").await?;
//! # let _ = customers;
//! session.logout().await;
//! # Ok(())
//! # }
//! ```

mod config;
mod controller;
mod error;
mod state;

pub use config::SessionConfig;
pub use controller::{SessionController, SessionControllerBuilder};
pub use error::SessionError;
pub use state::SessionState;

pub use latchkey_gateway as gateway;
pub use latchkey_protocol as protocol;
pub use latchkey_request as request;
pub use latchkey_store as store;
pub use latchkey_timer as timer;

/// Everything an application needs to wire up a session.
pub mod prelude {
    pub use crate::{SessionConfig, SessionController, SessionError, SessionState};
    pub use latchkey_gateway::{ApiClient, AuthGateway, GatewayConfig, GatewayError, HttpAuthGateway};
    pub use latchkey_protocol::{AccessToken, LoginRequest, User, UserId};
    pub use latchkey_request::{CookieSource, RequestPipeline};
    pub use latchkey_store::Session;
    pub use latchkey_timer::{ManualTimer, Timer, TokioTimer};
}
