//! Deferred-task timers and proactive credential renewal for latchkey.
//!
//! Two layers:
//!
//! - [`Timer`]: "run this future once, after this delay, unless
//!   cancelled". [`TokioTimer`] does it with `tokio::time`; [`ManualTimer`]
//!   is a deterministic fake whose clock only moves when a test says so.
//! - [`RefreshScheduler`]: keeps at most one renewal timer armed, firing
//!   [`REFRESH_BUFFER`] before the credential expires.
//!
//! # Integration
//!
//! The session controller owns one scheduler and re-arms it whenever a new
//! access token arrives:
//!
//! ```
//! use latchkey_timer::{ManualTimer, RefreshScheduler};
//!
//! let scheduler = RefreshScheduler::new(ManualTimer::new());
//! // A 900 s token is renewed at 840 s.
//! assert!(scheduler.arm(900, || async { /* renew the token */ }));
//! assert_eq!(scheduler.armed_delay(), Some(std::time::Duration::from_secs(840)));
//! ```

use std::fmt;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::sync::oneshot;

mod manual;
mod scheduler;

pub use manual::ManualTimer;
pub use scheduler::{REFRESH_BUFFER, RefreshScheduler};

/// A boxed unit of deferred work.
pub type TimerTask = BoxFuture<'static, ()>;

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

/// Schedules a task to run once after a delay.
///
/// This is the seam that keeps platform time out of the session logic:
/// production code passes a [`TokioTimer`], tests pass a [`ManualTimer`].
pub trait Timer: Send + Sync + 'static {
    /// Runs `task` once, `delay` from now. The returned handle can cancel
    /// it until it starts running.
    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerHandle;
}

/// Cancellation handle for a scheduled task.
///
/// Dropping the handle does **not** cancel the task; the task is then
/// simply detached. Cancellation is always explicit.
pub struct TimerHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TimerHandle {
    /// Wraps a cancel action. The action runs at most once.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Cancels the task if it hasn't started. Calling this more than once,
    /// or after the task ran, does nothing.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// `true` once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_none()
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// TokioTimer
// ---------------------------------------------------------------------------

/// [`Timer`] backed by `tokio::time::sleep` on a spawned task.
///
/// Must be used from within a Tokio runtime. Respects
/// `tokio::time::pause()`, so tests can also drive it with paused time.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerHandle {
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => task.await,
                // A dropped sender yields `Err`, which doesn't match, so a
                // dropped handle leaves the timer running.
                Ok(()) = &mut cancel_rx => {
                    tracing::trace!("timer cancelled before firing");
                }
            }
        });

        TimerHandle::new(move || {
            let _ = cancel_tx.send(());
        })
    }
}
