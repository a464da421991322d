//! Wire protocol for latchkey.
//!
//! This crate defines the "language" spoken with the `/auth` endpoints:
//!
//! - **Identity** ([`User`], [`UserId`]): who is signed in.
//! - **Credentials** ([`AccessToken`], [`AccessGrant`]): the short-lived
//!   bearer credential and its lifetime.
//! - **Requests/responses** ([`LoginRequest`], [`LoginResponse`],
//!   [`TokenResponse`], ...): the JSON bodies exchanged with the server.
//! - **Names** ([`paths`], [`CSRF_COOKIE`], [`CSRF_HEADER`]): endpoint
//!   paths, cookie and header names shared by every layer.
//!
//! # Architecture
//!
//! The protocol layer knows nothing about timers, stores or HTTP clients.
//! It only describes what travels on the wire.
//!
//! ```text
//! Gateway (HTTP) → Protocol (types) → Store / Controller (session state)
//! ```

mod types;

pub use types::{
    AccessGrant, AccessToken, ChangePasswordRequest, LoginRequest,
    LoginResponse, ProfileUpdate, TokenResponse, User, UserId,
};

/// Name of the readable cookie carrying the anti-forgery token.
pub const CSRF_COOKIE: &str = "csrf_token";

/// Header the anti-forgery token is echoed back in.
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// Authorization scheme used for the access token.
pub const BEARER_SCHEME: &str = "Bearer";

/// Endpoint paths, relative to the API base URL.
pub mod paths {
    /// Base path of every session endpoint.
    pub const AUTH_BASE: &str = "/auth";
    /// `POST`: exchange username/password for an access token.
    pub const LOGIN: &str = "/auth/login";
    /// `POST`: end the server-side session and clear its cookie.
    pub const LOGOUT: &str = "/auth/logout";
    /// `POST`: mint a new access token from the session cookie.
    pub const REFRESH: &str = "/auth/refresh";
    /// `GET` reads the profile, `PATCH` updates it.
    pub const ME: &str = "/auth/me";
    /// `POST`: change the signed-in user's password.
    pub const CHANGE_PASSWORD: &str = "/auth/change-password";
}
