//! Trailing-edge debouncing driven by caller-supplied instants.

use std::time::{Duration, Instant};

/// Collapses a burst of requests into one that fires `interval` after the
/// last request.
///
/// The debouncer owns no timer. The caller reports requests with
/// [`Debouncer::schedule`] and asks [`Debouncer::fire`] whether the quiet
/// period is over.
#[derive(Debug, Clone)]
pub struct Debouncer {
    interval: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet period.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    /// The quiet period.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Record a request made at `now`, pushing the deadline back.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
    }

    /// When the pending request becomes due, if there is one.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether a request is waiting.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Whether the pending request is due at `now`. Returns `true` once per
    /// burst.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drop the pending request.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
