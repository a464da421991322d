//! The credential store: a single observable slot for the [`Session`].
//!
//! # Why a `watch` channel?
//!
//! Observers (UI bindings, request logging, other modules) need to react
//! whenever the session changes, and they only ever care about the latest
//! value. `tokio::sync::watch` is exactly that: one current value, any
//! number of receivers, and each receiver is woken on change.
//!
//! The store keeps the `Sender` and never exposes it. Readers get a
//! `Receiver` from [`CredentialStore::subscribe`] and can only look.

use latchkey_protocol::{AccessToken, User};
use tokio::sync::watch;

use crate::Session;

/// Holds the current session in memory and notifies subscribers on change.
///
/// Every operation is synchronous and infallible. There is no persistence:
/// dropping the store drops the credential.
///
/// ## Lifecycle
///
/// ```text
/// set() ──→ set_access_token() / set_user() ──→ clear()
///   │                │                             │
///   ▼                ▼                             ▼
/// [user+token]   [one field replaced]           [empty]
/// ```
#[derive(Debug)]
pub struct CredentialStore {
    tx: watch::Sender<Session>,
}

impl CredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        // The initial receiver is dropped straight away; `send_replace` and
        // friends keep working with zero receivers.
        let (tx, _rx) = watch::channel(Session::default());
        Self { tx }
    }

    /// Returns a copy of the current session.
    pub fn get(&self) -> Session {
        self.tx.borrow().clone()
    }

    /// Stores a user and token together (login).
    pub fn set(&self, user: User, access_token: AccessToken) {
        tracing::debug!(username = %user.username, "credential store: session set");
        self.tx.send_replace(Session {
            user: Some(user),
            access_token: Some(access_token),
        });
    }

    /// Replaces the token, keeping the user (refresh).
    pub fn set_access_token(&self, access_token: AccessToken) {
        self.tx.send_modify(|s| s.access_token = Some(access_token));
        tracing::trace!("credential store: access token replaced");
    }

    /// Replaces the user, keeping the token (profile edit, bootstrap).
    pub fn set_user(&self, user: User) {
        tracing::trace!(username = %user.username, "credential store: user replaced");
        self.tx.send_modify(|s| s.user = Some(user));
    }

    /// Drops the user and token.
    ///
    /// Clearing an already-empty store does not wake subscribers.
    pub fn clear(&self) {
        let changed = self.tx.send_if_modified(|s| {
            if s.is_empty() {
                false
            } else {
                *s = Session::default();
                true
            }
        });
        if changed {
            tracing::debug!("credential store: session cleared");
        }
    }

    /// Returns a receiver that observes every change to the session.
    ///
    /// The receiver starts with the current value marked as seen; call
    /// `changed().await` to wait for the next mutation.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    /// Shorthand for `get().is_authenticated()` without cloning.
    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_authenticated()
    }

    /// Returns the current user, if any.
    pub fn user(&self) -> Option<User> {
        self.tx.borrow().user.clone()
    }

    /// Returns the current token, if any.
    pub fn access_token(&self) -> Option<AccessToken> {
        self.tx.borrow().access_token.clone()
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
