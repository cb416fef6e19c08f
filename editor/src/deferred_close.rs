//! Cancelable deferred close used when the editor loses focus.
//!
//! Blur does not close the mention session right away: a pointer press on a
//! candidate may be what moved focus, and it must get to commit first. The
//! close is scheduled for a deadline and the host polls
//! [`DeferredClose::take_if_due`] from its tick loop; a commit or a refocus
//! cancels it.

use std::time::Duration;
use std::time::Instant;

pub const DEFAULT_BLUR_CLOSE_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeferredClose {
    deadline: Option<Instant>,
}

impl DeferredClose {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a close `delay` after `now`, replacing any earlier schedule.
    pub fn schedule(&mut self, now: Instant, delay: Duration) {
        self.deadline = now.checked_add(delay).or(Some(now));
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns `true` exactly once, on the first poll at or after the deadline.
    pub fn take_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
