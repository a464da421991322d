//! The session record: who is signed in and with which credential.

use latchkey_protocol::{AccessToken, User};

/// Snapshot of the client's session.
///
/// `user` and `access_token` are normally set and cleared together. The
/// one exception is bootstrap, where the token arrives from
/// `/auth/refresh` before the profile from `/auth/me` resolves.
///
/// `Debug` is safe to log: [`AccessToken`] redacts itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// The signed-in user, if any.
    pub user: Option<User>,
    /// The current short-lived credential, if any.
    pub access_token: Option<AccessToken>,
}

impl Session {
    /// A session is authenticated once its user is known.
    ///
    /// A token without a user (mid-bootstrap) does not count.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Returns `true` if neither a user nor a token is held.
    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.access_token.is_none()
    }
}

#[cfg(test)]
mod tests {
    use latchkey_protocol::UserId;

    use super::*;

    fn user() -> User {
        User {
            id: UserId(1),
            username: "testuser".into(),
            display_name: "Test".into(),
            email: None,
            role: "staff".into(),
            is_active: true,
        }
    }

    #[test]
    fn test_default_session_is_empty_and_unauthenticated() {
        let s = Session::default();
        assert!(s.is_empty());
        assert!(!s.is_authenticated());
    }

    #[test]
    fn test_token_without_user_is_not_authenticated() {
        let s = Session {
            user: None,
            access_token: Some(AccessToken::new("t")),
        };
        assert!(!s.is_authenticated());
        assert!(!s.is_empty());
    }

    #[test]
    fn test_debug_output_does_not_contain_token() {
        let s = Session {
            user: Some(user()),
            access_token: Some(AccessToken::new("very-secret-token")),
        };
        let printed = format!("{s:?}");
        assert!(printed.contains("testuser"));
        assert!(!printed.contains("very-secret-token"));
    }
}
