//! Proactive renewal scheduling.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures_util::FutureExt;
use parking_lot::Mutex;
use tracing::debug;

use crate::{Timer, TimerHandle};

/// How long before expiry a credential is renewed (one minute).
pub const REFRESH_BUFFER: Duration = Duration::from_secs(60);

/// The single armed renewal timer, if any.
struct Armed {
    generation: u64,
    due_in: Duration,
    handle: TimerHandle,
}

/// Arms one cancellable renewal task ahead of credential expiry.
///
/// Invariant: at most one timer is armed at any instant. Every
/// [`arm`](Self::arm) cancels the previous timer before doing anything
/// else, so two renewals can never be pending at once.
///
/// The scheduler is a pure timing primitive. It never fails and knows
/// nothing about what renewal means; the callback decides that.
///
/// Dropping the scheduler disarms it.
pub struct RefreshScheduler<T: Timer> {
    timer: T,
    buffer: Duration,
    slot: Arc<Mutex<Option<Armed>>>,
    next_generation: AtomicU64,
}

impl<T: Timer> RefreshScheduler<T> {
    /// A scheduler using the default one-minute [`REFRESH_BUFFER`].
    pub fn new(timer: T) -> Self {
        Self::with_buffer(timer, REFRESH_BUFFER)
    }

    /// A scheduler renewing `buffer` before expiry.
    pub fn with_buffer(timer: T, buffer: Duration) -> Self {
        Self {
            timer,
            buffer,
            slot: Arc::new(Mutex::new(None)),
            next_generation: AtomicU64::new(1),
        }
    }

    /// The delay `arm(ttl_secs, ..)` would use, or `None` if a credential
    /// with that lifetime is too short-lived to renew proactively.
    ///
    /// `ttl * 1000 - buffer` in milliseconds; anything at or below zero
    /// yields `None`.
    pub fn due_in(&self, ttl_secs: u64) -> Option<Duration> {
        Duration::from_secs(ttl_secs)
            .checked_sub(self.buffer)
            .filter(|d| !d.is_zero())
    }

    /// Cancels any armed timer, then schedules `on_due` to run once, a
    /// buffer's length before a credential with lifetime `ttl_secs`
    /// expires.
    ///
    /// If the lifetime is at or below the buffer nothing new is armed
    /// (renewing immediately would loop) and `false` is returned. The
    /// previous timer is still cancelled: it belonged to an older
    /// credential.
    pub fn arm<F, Fut>(&self, ttl_secs: u64, on_due: F) -> bool
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut slot = self.slot.lock();
        if let Some(mut previous) = slot.take() {
            previous.handle.cancel();
            debug!(
                generation = previous.generation,
                "previous refresh timer cancelled"
            );
        }

        let Some(due_in) = self.due_in(ttl_secs) else {
            debug!(
                ttl_secs,
                buffer_secs = self.buffer.as_secs(),
                "credential lifetime within refresh buffer, not arming"
            );
            return false;
        };

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let weak = Arc::downgrade(&self.slot);
        let task = async move {
            // Only the timer that is still current may run; one that was
            // superseded between firing and getting here bows out.
            if release_if_current(&weak, generation) {
                on_due().await;
            }
        }
        .boxed();

        let handle = self.timer.schedule(due_in, task);
        *slot = Some(Armed {
            generation,
            due_in,
            handle,
        });

        debug!(
            generation,
            ttl_secs,
            due_in = ?due_in,
            "refresh timer armed"
        );
        true
    }

    /// Cancels the armed timer, if any. Safe to call at any time.
    pub fn disarm(&self) {
        if let Some(mut armed) = self.slot.lock().take() {
            armed.handle.cancel();
            debug!(generation = armed.generation, "refresh timer disarmed");
        }
    }

    /// `true` while a timer is armed and hasn't fired.
    pub fn is_armed(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// The delay the armed timer was scheduled with.
    pub fn armed_delay(&self) -> Option<Duration> {
        self.slot.lock().as_ref().map(|a| a.due_in)
    }

    /// The configured renewal buffer.
    pub fn buffer(&self) -> Duration {
        self.buffer
    }
}

impl<T: Timer> Drop for RefreshScheduler<T> {
    fn drop(&mut self) {
        self.disarm();
    }
}

impl<T: Timer> std::fmt::Debug for RefreshScheduler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshScheduler")
            .field("buffer", &self.buffer)
            .field("armed_delay", &self.armed_delay())
            .finish()
    }
}

/// Clears the slot if it still holds `generation`. Returns whether it did.
fn release_if_current(slot: &Weak<Mutex<Option<Armed>>>, generation: u64) -> bool {
    let Some(shared) = slot.upgrade() else {
        return false;
    };
    let mut armed = shared.lock();
    let current = matches!(armed.as_ref(), Some(a) if a.generation == generation);
    if current {
        *armed = None;
    }
    current
}
