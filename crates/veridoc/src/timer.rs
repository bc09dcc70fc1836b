//! Wall-clock timing of claim executions.

use std::time::{Duration, Instant};

/// Measures how long a single claim took.
///
/// `stop` is a no-op unless the timer is running. Stopping twice keeps the
/// first measurement.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timer {
    started: Option<Instant>,
    stopped: Option<Instant>,
}

impl Timer {
    /// Create an idle timer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            started: None,
            stopped: None,
        }
    }

    /// Create a timer that is already running
    #[must_use]
    pub fn started() -> Self {
        let mut timer = Self::new();
        timer.start();
        timer
    }

    /// Start (or restart) the timer
    pub fn start(&mut self) {
        self.started = Some(Instant::now());
        self.stopped = None;
    }

    /// Stop the timer if it is running
    pub fn stop(&mut self) {
        if self.started.is_some() && self.stopped.is_none() {
            self.stopped = Some(Instant::now());
        }
    }

    /// Elapsed time between start and stop, if both happened
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        match (self.started, self.stopped) {
            (Some(started), Some(stopped)) => Some(stopped.duration_since(started)),
            _ => None,
        }
    }

    /// Elapsed time in whole milliseconds
    #[must_use]
    pub fn duration_millis(&self) -> Option<u128> {
        self.duration().map(|d| d.as_millis())
    }
}
