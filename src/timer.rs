use super::*;
use std::time::Duration;
use tokio::time::Instant;

/// How a round is timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Round ends when the deadline passes.
    Countdown(Duration),
    /// Round ends when the board has no match; elapsed time is shown.
    Elapsed,
    /// Round ends when the board has no match; nothing is shown.
    Untimed,
}

/// Round clock. Tracks the start of the current timing window and
/// derives deadline, remaining time and warning state from the mode.
#[derive(Debug)]
pub struct Timer {
    mode: Mode,
    warning: Duration,
    start: Instant,
}

impl Timer {
    pub fn new(mode: Mode, warning: Duration) -> Self {
        Self {
            mode,
            warning,
            start: Instant::now(),
        }
    }
    pub fn mode(&self) -> Mode {
        self.mode
    }
    /// Starts a fresh timing window.
    pub fn reset(&mut self) {
        self.start = Instant::now();
    }
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
    pub fn deadline(&self) -> Option<Instant> {
        match self.mode {
            Mode::Countdown(timeout) => Some(self.start + timeout),
            Mode::Elapsed | Mode::Untimed => None,
        }
    }
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline()
            .map(|d| d.saturating_duration_since(Instant::now()))
    }
    pub fn expired(&self) -> bool {
        self.deadline().map(|d| Instant::now() >= d).unwrap_or(false)
    }
    /// True inside the final warning window of a countdown.
    pub fn warn(&self) -> bool {
        self.remaining().map(|r| r <= self.warning).unwrap_or(false)
    }
    /// How long the dealer may sleep before the next display update.
    pub fn until_tick(&self, tick: Duration) -> Duration {
        self.remaining()
            .map(|r| r.min(tick))
            .unwrap_or(tick)
    }
    /// Display event for the current clock state, if the mode shows one.
    pub fn event(&self) -> Option<Event> {
        match self.mode {
            Mode::Countdown(_) => Some(Event::Countdown {
                remaining: self.remaining().unwrap_or_default(),
                warn: self.warn(),
            }),
            Mode::Elapsed => Some(Event::Elapsed(self.elapsed())),
            Mode::Untimed => None,
        }
    }
}
