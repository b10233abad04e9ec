//! Settle-period debouncing.
//!
//! A modification arms the timer; every further modification pushes the
//! deadline back to a full settle period from now. When the deadline
//! passes untouched, exactly one trigger is due.

use std::time::Duration;
use tokio::time::Instant;

/// Whether a run is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    Armed { deadline: Instant },
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    settle: Duration,
    state: DebounceState,
}

impl Debouncer {
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            state: DebounceState::Idle,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> DebounceState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, DebounceState::Armed { .. })
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            DebounceState::Idle => None,
            DebounceState::Armed { deadline } => Some(deadline),
        }
    }

    /// Records a qualifying modification at `now`.
    pub fn arm(&mut self, now: Instant) {
        self.state = DebounceState::Armed {
            deadline: now + self.settle,
        };
    }

    /// Returns `true`, once, if the settle period has passed.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.state {
            DebounceState::Armed { deadline } if now >= deadline => {
                self.state = DebounceState::Idle;
                true
            }
            _ => false,
        }
    }

    /// Drops any pending trigger. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        let was_armed = self.is_armed();
        self.state = DebounceState::Idle;
        was_armed
    }
}
