//! Caller supplied deadlines

use std::time::{Duration, Instant};

/// Upper bound on how long an operation may wait on the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// No deadline; the store's configured busy timeout applies
    pub fn none() -> Self {
        Self { at: None }
    }

    /// Expires at the given instant
    pub fn at(instant: Instant) -> Self {
        Self { at: Some(instant) }
    }

    /// Expires after the given duration from now
    pub fn within(timeout: Duration) -> Self {
        Self::at(Instant::now() + timeout)
    }

    /// Returns the expiry instant, if any
    pub fn instant(&self) -> Option<Instant> {
        self.at
    }

    /// Time left before expiry. `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.at.map(|t| t.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.remaining(), Some(d) if d.is_zero())
    }

    /// The busy wait bound to use given the configured default
    pub fn bound(&self, default: Duration) -> Duration {
        match self.remaining() {
            Some(left) => left.min(default),
            None => default,
        }
    }
}
