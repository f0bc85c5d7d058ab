//! Cooperative time control.
//!
//! The search polls [`Deadline::check`] at the top of every node and unwinds
//! with `?` once it fails, popping each move on the way out.

use std::time::{Duration, Instant};

use crate::sync::StopFlag;

/// Marker returned when the deadline has passed or a stop was requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cancelled;

#[derive(Clone, Debug, Default)]
pub struct Deadline {
    armed: bool,
    expires_at: Option<Instant>,
    stop: Option<StopFlag>,
}

impl Deadline {
    /// An unarmed deadline; it never fires until [`Deadline::arm`] is called.
    pub fn new(stop: Option<StopFlag>) -> Self {
        Deadline {
            armed: false,
            expires_at: None,
            stop,
        }
    }

    /// Start counting `budget` from now. `None` means no time limit, though
    /// the stop flag is still honoured.
    pub fn arm(&mut self, budget: Option<Duration>) {
        self.armed = true;
        self.expires_at = budget.and_then(|b| Instant::now().checked_add(b));
    }

    pub fn disarm(&mut self) {
        self.armed = false;
        self.expires_at = None;
    }

    pub fn expired(&self) -> bool {
        if !self.armed {
            return false;
        }
        if self.stop.as_ref().is_some_and(StopFlag::is_stopped) {
            return true;
        }
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }

    #[inline]
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.expired() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}
