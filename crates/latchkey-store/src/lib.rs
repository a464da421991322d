//! Volatile credential storage for latchkey.
//!
//! This crate holds the one piece of mutable session state on the client:
//!
//! 1. **Session**: the signed-in [`User`](latchkey_protocol::User) and
//!    the current [`AccessToken`](latchkey_protocol::AccessToken)
//!    ([`Session`]).
//! 2. **Store**: the slot that owns it and tells observers when it
//!    changes ([`CredentialStore`]).
//!
//! Nothing in here touches the disk. The access token lives in memory
//! only and disappears with the process.
//!
//! # How it fits in the stack
//!
//! ```text
//! Controller (above)  ← the only writer
//!     ↕
//! Store (this crate)  ← holds Session, notifies subscribers
//!     ↕
//! UI / other modules  ← read-only observers via subscribe()
//! ```

mod session;
mod store;

pub use session::Session;
pub use store::CredentialStore;
