//! Controller lifecycle states.

use std::fmt;

/// Where the session controller is in its lifecycle.
///
/// ```text
///                 bootstrap()
/// Unauthenticated ──────────→ Bootstrapping ──ok──→ Authenticated ⇄ Refreshing
///        ▲                          │                     │             │
///        └─────────── failure ──────┘◄── logout / renewal failure ──────┘
/// ```
///
/// `login()` goes straight from any state to `Authenticated`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No session. The initial state, and where every failure lands.
    #[default]
    Unauthenticated,

    /// Trying to restore a session from the long-lived cookie.
    Bootstrapping,

    /// A user and access token are held.
    Authenticated,

    /// Authenticated, with a renewal in flight. The last-known-good token
    /// stays usable until the renewal lands.
    Refreshing,
}

impl SessionState {
    /// `true` for `Authenticated` and `Refreshing`.
    pub fn has_session(self) -> bool {
        matches!(self, SessionState::Authenticated | SessionState::Refreshing)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Bootstrapping => "bootstrapping",
            SessionState::Authenticated => "authenticated",
            SessionState::Refreshing => "refreshing",
        };
        f.write_str(name)
    }
}
