//! Core protocol types for the `/auth` wire format.
//!
//! Every type here is serialized to or deserialized from JSON with
//! snake_case field names, matching what the server sends.
//!
//! Several types hold secrets (the access token, passwords). Their `Debug`
//! implementations are written by hand so that a stray `{:?}` in a log
//! line can never leak the secret.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a user account.
///
/// Newtype wrapper so a user ID can't be confused with any other integer.
/// `#[serde(transparent)]` keeps it a bare number on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

/// The identity record returned by `/auth/login` and `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned account ID.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Name shown in the UI.
    pub display_name: String,
    /// Contact address, if the account has one.
    #[serde(default)]
    pub email: Option<String>,
    /// Role name (e.g. `"admin"`, `"staff"`). Authorization is enforced
    /// server-side; the client only displays it.
    pub role: String,
    /// Whether the account is enabled.
    pub is_active: bool,
}

// ---------------------------------------------------------------------------
// AccessToken
// ---------------------------------------------------------------------------

/// The short-lived bearer credential.
///
/// The value is opaque to the client. It must never end up in a log, a
/// URL, or durable storage, so:
///
/// - `Debug` prints `AccessToken(<redacted>)`.
/// - There is no `Display` impl, so `{}` formatting doesn't compile.
/// - Reading the raw string requires an explicit [`expose`](Self::expose).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw token string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw token. Only call this where the value is sent to
    /// the server (the `Authorization` header).
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// A freshly issued access token together with its lifetime.
///
/// Both login and refresh responses boil down to this; the controller
/// only needs the token and the TTL to update the store and arm renewal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGrant {
    /// The new credential.
    pub token: AccessToken,
    /// Seconds until the credential expires, as reported by the server.
    pub expires_in: u64,
}

impl AccessGrant {
    /// The lifetime as a `Duration`.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.expires_in)
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of `POST /auth/login`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Asks the server for a longer-lived session cookie.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remember_me: Option<bool>,
}

impl LoginRequest {
    /// Builds a login request without the remember-me flag.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            remember_me: None,
        }
    }

    /// Sets the remember-me flag.
    pub fn remember_me(mut self, remember: bool) -> Self {
        self.remember_me = Some(remember);
        self
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("remember_me", &self.remember_me)
            .finish()
    }
}

/// Body of `PATCH /auth/me`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Body of `POST /auth/change-password`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

impl fmt::Debug for ChangePasswordRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangePasswordRequest")
            .field("current_password", &"<redacted>")
            .field("new_password", &"<redacted>")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Body returned by `POST /auth/login`.
///
/// The server also sets the HttpOnly session cookie and the readable
/// `csrf_token` cookie; `csrf_token` here mirrors the latter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: AccessToken,
    pub token_type: String,
    pub expires_in: u64,
    pub user: User,
    #[serde(default)]
    pub csrf_token: Option<String>,
}

impl LoginResponse {
    /// The credential part of the response.
    pub fn grant(&self) -> AccessGrant {
        AccessGrant {
            token: self.access_token.clone(),
            expires_in: self.expires_in,
        }
    }
}

/// Body returned by `POST /auth/refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: AccessToken,
    pub token_type: String,
    pub expires_in: u64,
}

impl TokenResponse {
    /// Converts the response into an [`AccessGrant`].
    pub fn into_grant(self) -> AccessGrant {
        AccessGrant {
            token: self.access_token,
            expires_in: self.expires_in,
        }
    }
}
