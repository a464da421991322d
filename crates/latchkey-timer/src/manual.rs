//! A deterministic [`Timer`] for tests.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;

use crate::{Timer, TimerHandle, TimerTask};

/// A [`Timer`] whose clock only moves when [`advance`](Self::advance) is
/// called.
///
/// Scheduled tasks are kept in a list together with the delay they were
/// scheduled with. Tests can inspect that list (how many timers are
/// pending, and when each would fire) and then move time forward to run
/// whatever falls due, in deadline order.
///
/// Cloning yields another handle to the same clock.
#[derive(Clone, Default)]
pub struct ManualTimer {
    state: Arc<Mutex<ManualState>>,
}

#[derive(Default)]
struct ManualState {
    /// Virtual time elapsed since creation.
    now: Duration,
    next_id: u64,
    pending: Vec<PendingTask>,
}

struct PendingTask {
    id: u64,
    delay: Duration,
    deadline: Duration,
    task: TimerTask,
}

impl ManualTimer {
    /// Creates a timer at virtual time zero with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.state.lock().now
    }

    /// Number of scheduled, not yet fired, not cancelled tasks.
    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// The delays pending tasks were scheduled with, in scheduling order.
    pub fn pending_delays(&self) -> Vec<Duration> {
        self.state.lock().pending.iter().map(|p| p.delay).collect()
    }

    /// Time remaining until the earliest pending task is due.
    pub fn next_due_in(&self) -> Option<Duration> {
        let state = self.state.lock();
        state
            .pending
            .iter()
            .map(|p| p.deadline.saturating_sub(state.now))
            .min()
    }

    /// Moves the clock forward by `by`, running every task that falls due
    /// on the way, earliest deadline first.
    ///
    /// Tasks run to completion one at a time. A task may schedule new
    /// tasks; those run too if they fall due within the window.
    pub async fn advance(&self, by: Duration) {
        let target = self.now() + by;
        while let Some(task) = self.take_due(target) {
            task.await;
        }
        self.state.lock().now = target;
    }

    /// Jumps straight to the earliest pending deadline and runs that task.
    ///
    /// Returns `false` if nothing was pending.
    pub async fn fire_next(&self) -> bool {
        let Some(due_in) = self.next_due_in() else {
            return false;
        };
        let target = self.now() + due_in;
        match self.take_due(target) {
            Some(task) => {
                task.await;
                true
            }
            None => false,
        }
    }

    /// Removes the earliest task due at or before `target`, advancing the
    /// clock to its deadline.
    fn take_due(&self, target: Duration) -> Option<TimerTask> {
        let mut state = self.state.lock();
        let index = state
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.deadline <= target)
            .min_by_key(|(_, p)| (p.deadline, p.id))
            .map(|(i, _)| i)?;
        let due = state.pending.remove(index);
        state.now = state.now.max(due.deadline);
        Some(due.task)
    }

    fn cancel(state: &Weak<Mutex<ManualState>>, id: u64) {
        if let Some(state) = state.upgrade() {
            state.lock().pending.retain(|p| p.id != id);
        }
    }
}

impl Timer for ManualTimer {
    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerHandle {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        let deadline = state.now + delay;
        state.pending.push(PendingTask {
            id,
            delay,
            deadline,
            task,
        });

        let weak = Arc::downgrade(&self.state);
        TimerHandle::new(move || ManualTimer::cancel(&weak, id))
    }
}

impl fmt::Debug for ManualTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualTimer")
            .field("now", &self.now())
            .field("pending", &self.pending_delays())
            .finish()
    }
}
