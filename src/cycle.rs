//! Work/break cycle state
//!
//! [`CycleState`] is owned by the event thread and only changed through the
//! transitions below. Scheduling and painting are layered on top by
//! [`crate::PomodoroCore`].

use crate::config_file::Config;
use std::fmt;

/// Which half of a Pomodoro cycle is counting down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Work,
    Break,
}

impl Phase {
    /// The phase entered when this one expires
    pub fn next(self) -> Self {
        match self {
            Phase::Work => Phase::Break,
            Phase::Break => Phase::Work,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Work => "Work",
            Phase::Break => "Break",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one countdown step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    /// Not running; nothing changed
    Ignored,
    /// `shown` seconds were on the clock and one second was consumed
    Counted { shown: u64 },
    /// The clock was already at zero; the phase must switch
    Expired,
}

/// Current phase, seconds left in it, and whether the countdown is live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleState {
    phase: Phase,
    remaining_seconds: u64,
    running: bool,
}

impl CycleState {
    /// Idle at the start of a work phase
    pub fn new(config: &Config) -> Self {
        Self {
            phase: Phase::Work,
            remaining_seconds: config.duration_secs(Phase::Work),
            running: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Idle -> Active. Returns false if already active.
    pub fn begin(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        true
    }

    /// Active -> Idle, keeping the remaining time. Returns false if already idle.
    pub fn halt(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        true
    }

    /// Consume one second if running
    pub fn count_down(&mut self) -> Countdown {
        if !self.running {
            return Countdown::Ignored;
        }
        if self.remaining_seconds == 0 {
            return Countdown::Expired;
        }
        let shown = self.remaining_seconds;
        self.remaining_seconds -= 1;
        Countdown::Counted { shown }
    }

    /// Enter the other phase with its full configured duration
    pub fn advance_phase(&mut self, config: &Config) -> Phase {
        self.phase = self.phase.next();
        self.remaining_seconds = config.duration_secs(self.phase);
        self.phase
    }

    /// Pick up new durations. Only an idle countdown is reset; a running one
    /// keeps going and sees the new durations at its next phase switch.
    ///
    /// Returns true if `remaining_seconds` was reset.
    pub fn reconcile(&mut self, config: &Config) -> bool {
        if self.running {
            return false;
        }
        self.remaining_seconds = config.duration_secs(self.phase);
        true
    }
}
