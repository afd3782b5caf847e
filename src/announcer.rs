//! Phase transition flash
//!
//! A phase switch is announced by fading a full-screen overlay in the new
//! phase's color up to a peak opacity and back down to zero. The opacity
//! values come from [`Fade`], a finite iterator that cannot be restarted;
//! the event thread pulls one value per scheduled wake-up.

use crate::constants::{FLASH_DURATION_MS, FLASH_PEAK_OPACITY, FLASH_STEPS};
use std::iter::FusedIterator;
use std::time::Duration;

/// Shape and pacing of the flash
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeSettings {
    /// Fade-in plus fade-out wall-clock length
    pub duration: Duration,
    /// Increments per half; clamped to at least 1
    pub steps: u32,
    /// Opacity reached between the two halves
    pub peak: f32,
}

impl Default for FadeSettings {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(FLASH_DURATION_MS),
            steps: FLASH_STEPS,
            peak: FLASH_PEAK_OPACITY,
        }
    }
}

impl FadeSettings {
    /// Gap between consecutive opacity steps
    pub fn interval(&self) -> Duration {
        self.duration / (2 * self.steps.max(1))
    }

    /// Number of opacity values a full fade produces
    pub fn total_steps(&self) -> u32 {
        2 * self.steps.max(1)
    }
}

/// Where the fade is; the step is the next one to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeState {
    FadeIn(u32),
    FadeOut(u32),
    Done,
}

/// Which half of the pulse is playing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    FadeIn,
    FadeOut,
}

/// Opacity sequence: `steps` values rising to `peak`, then `steps` values
/// falling to exactly 0.0
#[derive(Debug, Clone)]
pub struct Fade {
    steps: u32,
    peak: f32,
    state: FadeState,
}

impl Fade {
    pub fn new(settings: &FadeSettings) -> Self {
        Self {
            steps: settings.steps.max(1),
            peak: settings.peak,
            state: FadeState::FadeIn(1),
        }
    }

    pub fn state(&self) -> FadeState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == FadeState::Done
    }

    fn opacity_at(&self, step: u32) -> f32 {
        // ratio first so step == steps lands exactly on peak
        self.peak * (step as f32 / self.steps as f32)
    }
}

impl Iterator for Fade {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        match self.state {
            FadeState::FadeIn(step) => {
                let opacity = self.opacity_at(step);
                self.state = if step < self.steps {
                    FadeState::FadeIn(step + 1)
                } else {
                    FadeState::FadeOut(self.steps - 1)
                };
                Some(opacity)
            }
            FadeState::FadeOut(step) => {
                let opacity = self.opacity_at(step);
                self.state = if step > 0 {
                    FadeState::FadeOut(step - 1)
                } else {
                    FadeState::Done
                };
                Some(opacity)
            }
            FadeState::Done => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = match self.state {
            FadeState::FadeIn(step) => (self.steps - step + 1 + self.steps) as usize,
            FadeState::FadeOut(step) => (step + 1) as usize,
            FadeState::Done => 0,
        };
        (left, Some(left))
    }
}

impl ExactSizeIterator for Fade {}

impl FusedIterator for Fade {}

/// One in-flight phase announcement
#[derive(Debug, Clone)]
pub struct Announcement {
    color: String,
    fade: Fade,
    interval: Duration,
    elapsed_step: u32,
}

impl Announcement {
    pub fn new(color: impl Into<String>, settings: &FadeSettings) -> Self {
        Self {
            color: color.into(),
            fade: Fade::new(settings),
            interval: settings.interval(),
            elapsed_step: 0,
        }
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Opacity steps already emitted
    pub fn elapsed_step(&self) -> u32 {
        self.elapsed_step
    }

    /// Half currently playing, or None once finished
    pub fn direction(&self) -> Option<Direction> {
        match self.fade.state() {
            FadeState::FadeIn(_) => Some(Direction::FadeIn),
            FadeState::FadeOut(_) => Some(Direction::FadeOut),
            FadeState::Done => None,
        }
    }

    /// Next opacity value, or None once the fade-out has reached zero
    pub fn next_opacity(&mut self) -> Option<f32> {
        let opacity = self.fade.next()?;
        self.elapsed_step += 1;
        Some(opacity)
    }

    pub fn is_finished(&self) -> bool {
        self.fade.is_done()
    }
}
