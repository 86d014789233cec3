//! Cancellable timer slots for cooperative, single-threaded engines.
//!
//! Engines never spawn timers of their own. Each one owns a few slots and
//! the host drives them: it calls the engine's `poll(now)` on every tick and
//! its `on_frame` hook right before painting. A slot holds at most one
//! pending wake-up, so re-arming replaces the previous one instead of
//! stacking a duplicate.

use std::time::{Duration, Instant};

/// A single pending "run once after a delay" wake-up.
#[derive(Debug, Clone, Default)]
pub struct Deadline {
    due: Option<Instant>,
}

impl Deadline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules the slot to fire `delay` after `now`, replacing any pending wake-up.
    pub fn arm(&mut self, now: Instant, delay: Duration) {
        self.due = Some(now + delay);
    }

    /// Cancels the pending wake-up, if any.
    pub fn cancel(&mut self) {
        self.due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.due.is_some()
    }

    pub fn due(&self) -> Option<Instant> {
        self.due
    }

    /// Disarms and returns true if the deadline has passed at `now`.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        if let Some(due) = self.due
            && now >= due
        {
            self.due = None;
            return true;
        }
        false
    }
}

/// A "run before the next paint" request.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameRequest {
    pending: bool,
}

impl FrameRequest {
    pub fn request(&mut self) {
        self.pending = true;
    }

    pub fn cancel(&mut self) {
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Consumes the request. Returns true if one was pending.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

/// Returns the earliest of two optional instants.
pub fn earliest(a: Option<Instant>, b: Option<Instant>) -> Option<Instant> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
