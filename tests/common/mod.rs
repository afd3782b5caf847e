// Shared helpers for the integration tests
#![allow(dead_code)]

use pomodoro_overlay::config_file::{Config, ConfigStore};
use pomodoro_overlay::cycle::Phase;
use pomodoro_overlay::error::ResourceError;
use pomodoro_overlay::scheduler::TimerQueue;
use pomodoro_overlay::surface::Surface;
use pomodoro_overlay::PomodoroCore;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Everything the core asked the surface to do, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Time(String),
    TextColor(String),
    Transparency(f32),
    FontSize(u32),
    AllowMove(bool),
    Visible(bool),
    FlashBegin(String),
    FlashOpacity(f32),
    FlashEnd,
    Settings(Config),
    Phase(Phase),
    Running(bool),
    Release,
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub paints: Vec<Paint>,
    pub fail_release: bool,
}

impl RecordingSurface {
    pub fn times(&self) -> Vec<&str> {
        self.paints
            .iter()
            .filter_map(|p| match p {
                Paint::Time(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn last_time(&self) -> Option<&str> {
        self.times().last().copied()
    }

    pub fn flash_opacities(&self) -> Vec<f32> {
        self.paints
            .iter()
            .filter_map(|p| match p {
                Paint::FlashOpacity(o) => Some(*o),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: impl Fn(&Paint) -> bool) -> usize {
        self.paints.iter().filter(|p| wanted(p)).count()
    }

    pub fn flash_begins(&self) -> usize {
        self.count(|p| matches!(p, Paint::FlashBegin(_)))
    }

    pub fn clear(&mut self) {
        self.paints.clear();
    }
}

impl Surface for RecordingSurface {
    fn show_time(&mut self, text: &str) {
        self.paints.push(Paint::Time(text.to_string()));
    }

    fn set_text_color(&mut self, color: &str) {
        self.paints.push(Paint::TextColor(color.to_string()));
    }

    fn set_transparency(&mut self, alpha: f32) {
        self.paints.push(Paint::Transparency(alpha));
    }

    fn set_font_size(&mut self, font_size: u32) {
        self.paints.push(Paint::FontSize(font_size));
    }

    fn set_allow_move(&mut self, allowed: bool) {
        self.paints.push(Paint::AllowMove(allowed));
    }

    fn set_visible(&mut self, visible: bool) {
        self.paints.push(Paint::Visible(visible));
    }

    fn begin_flash(&mut self, color: &str) {
        self.paints.push(Paint::FlashBegin(color.to_string()));
    }

    fn set_flash_opacity(&mut self, opacity: f32) {
        self.paints.push(Paint::FlashOpacity(opacity));
    }

    fn end_flash(&mut self) {
        self.paints.push(Paint::FlashEnd);
    }

    fn open_settings(&mut self, config: &Config) {
        self.paints.push(Paint::Settings(config.clone()));
    }

    fn phase_changed(&mut self, phase: Phase) {
        self.paints.push(Paint::Phase(phase));
    }

    fn running_changed(&mut self, running: bool) {
        self.paints.push(Paint::Running(running));
    }

    fn release(&mut self) -> Result<(), ResourceError> {
        self.paints.push(Paint::Release);
        if self.fail_release {
            return Err(ResourceError::new("surface", "window already gone"));
        }
        Ok(())
    }
}

pub type TestCore = PomodoroCore<RecordingSurface, TimerQueue>;

pub fn config(work_mins: u64, break_mins: u64) -> Config {
    Config {
        work_mins,
        break_mins,
        ..Default::default()
    }
}

/// Core on a virtual clock starting at `epoch`
pub fn core_at(config: Config, epoch: Instant) -> TestCore {
    PomodoroCore::new(
        ConfigStore::in_memory(config),
        RecordingSurface::default(),
        TimerQueue::new(epoch),
    )
}

pub fn core(work_mins: u64, break_mins: u64) -> TestCore {
    core_at(config(work_mins, break_mins), Instant::now())
}

/// Deliver every wake-up due up to `end`, each at its own deadline
pub fn run_until(core: &mut TestCore, end: Instant) {
    while let Some(deadline) = core.next_deadline() {
        if deadline > end {
            break;
        }
        core.run_due(deadline);
    }
    core.run_due(end);
}

pub fn run_for(core: &mut TestCore, elapsed: Duration) {
    let end = core.scheduler().now() + elapsed;
    run_until(core, end);
}

/// Unique per-test config file path under the system temp dir
pub fn temp_config_path(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push("pomodoro_overlay_tests");
    path.push(format!("{}_{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&path);
    path.push("config.toml");
    path
}
