// Library interface for Pomodoro Overlay
// This allows the binaries and tests to share the timer core

pub mod announcer;
pub mod app_state;
pub mod commands;
pub mod config;
pub mod config_file;
pub mod constants;
pub mod cycle;
pub mod error;
pub mod hotkeys;
pub mod lifecycle;
pub mod runtime;
pub mod scheduler;
pub mod surface;

use anyhow::Result;
use announcer::{Announcement, FadeSettings};
use app_state::{AppStatus, StatusSnapshot};
use commands::Command;
use config_file::{Config, ConfigStore};
use constants::TICK_INTERVAL_MS;
use cycle::{CycleState, Countdown};
use lifecycle::{ExitOutcome, Lifecycle, Presence, ShutdownSignal};
use log::{debug, error, info};
use scheduler::{Scheduler, TimerQueue, Wake};
use std::ops::ControlFlow;
use std::time::{Duration, Instant};
use surface::{format_clock, Surface};

/// Timer core shared between the terminal and tray apps
///
/// Owns the cycle state, the configuration store and the in-flight
/// transition flash. Every method must be called from the single event
/// thread; other threads talk to it through [`commands::CommandSender`].
pub struct PomodoroCore<S: Surface, Q: Scheduler = TimerQueue> {
    store: ConfigStore,
    cycle: CycleState,
    fade: FadeSettings,
    announcement: Option<Announcement>,
    tick_generation: u64,
    fade_generation: u64,
    visible: bool,
    surface: S,
    scheduler: Q,
    status: AppStatus,
    lifecycle: Lifecycle,
}

impl<S: Surface, Q: Scheduler> PomodoroCore<S, Q> {
    /// Create an idle core at the start of a work phase and paint it
    pub fn new(store: ConfigStore, surface: S, scheduler: Q) -> Self {
        let cycle = CycleState::new(store.config());
        let status = AppStatus::new(StatusSnapshot {
            phase: cycle.phase(),
            remaining_seconds: cycle.remaining_seconds(),
            running: false,
            visible: true,
            flashing: false,
            config: store.config().clone(),
        });

        let mut core = Self {
            store,
            cycle,
            fade: FadeSettings::default(),
            announcement: None,
            tick_generation: 0,
            fade_generation: 0,
            visible: true,
            surface,
            scheduler,
            status,
            lifecycle: Lifecycle::new(),
        };

        core.paint_cosmetics();
        core.surface.set_visible(true);
        core.show_remaining();
        info!(
            "Timer ready: {} work / {} break",
            format_clock(core.store.config().duration_secs(cycle::Phase::Work)),
            format_clock(core.store.config().duration_secs(cycle::Phase::Break))
        );
        core
    }

    /// Override the transition flash shape
    pub fn with_fade_settings(mut self, fade: FadeSettings) -> Self {
        self.fade = fade;
        self
    }

    pub fn cycle_state(&self) -> &CycleState {
        &self.cycle
    }

    pub fn is_running(&self) -> bool {
        self.cycle.is_running()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn announcement(&self) -> Option<&Announcement> {
        self.announcement.as_ref()
    }

    /// Read-only view for background presences
    pub fn status(&self) -> AppStatus {
        self.status.clone()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn scheduler(&self) -> &Q {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Q {
        &mut self.scheduler
    }

    /// Flag background threads poll to notice exit
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.lifecycle.signal()
    }

    /// Register a background presence to be stopped on exit
    pub fn register_presence(&mut self, presence: Box<dyn Presence>) {
        self.lifecycle.register(presence);
    }

    /// Start counting down from the current remaining time
    ///
    /// The current value is painted immediately and the next tick is armed.
    /// While a transition flash plays, ticking resumes when it ends.
    pub fn start(&mut self) {
        if !self.cycle.begin() {
            debug!("Start ignored: timer already running");
            return;
        }

        info!(
            "Timer started ({} phase, {} left)",
            self.cycle.phase(),
            format_clock(self.cycle.remaining_seconds())
        );
        self.surface.running_changed(true);

        if self.announcement.is_some() {
            debug!("Transition flash playing; ticking resumes when it ends");
            self.publish();
            return;
        }

        self.tick();
    }

    /// Pause the countdown, keeping the remaining time
    pub fn stop(&mut self) {
        if !self.cycle.halt() {
            debug!("Stop ignored: timer not running");
            return;
        }

        // Any tick already scheduled is now stale
        self.tick_generation += 1;

        info!(
            "Timer paused ({} phase, {} left)",
            self.cycle.phase(),
            format_clock(self.cycle.remaining_seconds())
        );
        self.surface.running_changed(false);
        self.publish();
    }

    pub fn toggle(&mut self) {
        if self.cycle.is_running() {
            self.stop();
        } else {
            self.start();
        }
    }

    /// One countdown step: paint, then consume a second or switch phase
    ///
    /// No-op while stopped or while a transition flash is playing.
    pub fn tick(&mut self) {
        if !self.cycle.is_running() {
            debug!("Tick ignored: timer stopped");
            return;
        }
        if self.announcement.is_some() {
            debug!("Tick ignored: transition flash playing");
            return;
        }

        self.show_remaining();
        match self.cycle.count_down() {
            Countdown::Counted { shown } => {
                debug!("Tick: {} -> {}", shown, self.cycle.remaining_seconds());
                self.arm_tick();
            }
            Countdown::Expired => self.switch_cycle(),
            Countdown::Ignored => {}
        }
        self.publish();
    }

    /// Enter the other phase and announce it
    ///
    /// Ticking is not re-armed here; the end of the flash does that.
    pub fn switch_cycle(&mut self) {
        // A tick armed before the switch must not run during the flash
        self.tick_generation += 1;

        let phase = self.cycle.advance_phase(self.store.config());
        let color = self.store.config().color(phase).to_string();
        info!(
            "Switching to {} phase ({})",
            phase,
            format_clock(self.cycle.remaining_seconds())
        );

        self.surface.set_text_color(&color);
        self.surface.phase_changed(phase);
        self.begin_announcement(color);
        self.publish();
    }

    /// Dispatch a wake-up delivered by the scheduler
    pub fn handle_wake(&mut self, wake: Wake) {
        match wake {
            Wake::Tick { generation } if generation == self.tick_generation => self.tick(),
            Wake::Fade { generation } if generation == self.fade_generation => {
                self.advance_fade()
            }
            stale => debug!("Dropping stale wake-up {:?}", stale),
        }
    }

    /// Merge a validated settings snapshot into the running timer
    ///
    /// Cosmetic fields apply at once. Durations reset the countdown only
    /// while stopped; a running countdown is never cut short or extended.
    pub fn apply_configuration(&mut self, snapshot: Config) {
        info!("Applying configuration: {:?}", snapshot);
        self.store.replace(snapshot);
        self.paint_cosmetics();

        if self.cycle.reconcile(self.store.config()) {
            self.show_remaining();
        } else {
            debug!("Timer running; new durations apply from the next phase");
        }
        self.publish();
    }

    /// Apply a snapshot and write it to the config file
    pub fn save_configuration(&mut self, snapshot: Config) -> Result<()> {
        self.apply_configuration(snapshot);
        self.store.persist()
    }

    pub fn current_configuration(&self) -> &Config {
        self.store.config()
    }

    pub fn open_settings(&mut self) {
        info!("Opening settings");
        self.surface.open_settings(self.store.config());
    }

    pub fn hide(&mut self) {
        self.set_visible(false);
    }

    pub fn show(&mut self) {
        self.set_visible(true);
    }

    pub fn toggle_visibility(&mut self) {
        self.set_visible(!self.visible);
    }

    /// Stop presences, release surface resources, and report whether the
    /// event loop should terminate. Safe to call repeatedly.
    pub fn exit(&mut self) -> ExitOutcome {
        let (outcome, _failures) = self.lifecycle.exit();
        if outcome == ExitOutcome::AlreadyExited {
            debug!("Exit already completed");
            return outcome;
        }

        if self.cycle.halt() {
            self.tick_generation += 1;
        }
        self.fade_generation += 1;
        if self.announcement.take().is_some() {
            self.surface.end_flash();
        }

        if let Err(e) = self.surface.release() {
            error!("{}", e);
        }

        self.publish();
        info!("Exit complete");
        outcome
    }

    /// Execute one intent taken off the command queue
    pub fn handle_command(&mut self, command: Command) -> ControlFlow<()> {
        debug!("Command: {:?}", command);
        match command {
            Command::Start => self.start(),
            Command::Stop => self.stop(),
            Command::Toggle => self.toggle(),
            Command::OpenSettings => self.open_settings(),
            Command::Hide => self.hide(),
            Command::Show => self.show(),
            Command::ToggleVisibility => self.toggle_visibility(),
            Command::ApplySettings { config, persist } => {
                if persist {
                    if let Err(e) = self.save_configuration(config) {
                        error!("Failed to save configuration: {:#}", e);
                    }
                } else {
                    self.apply_configuration(config);
                }
            }
            Command::Exit => {
                self.exit();
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn set_visible(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        info!("Timer window {}", if visible { "shown" } else { "hidden" });
        self.surface.set_visible(visible);
        self.publish();
    }

    fn arm_tick(&mut self) {
        self.tick_generation += 1;
        self.scheduler.schedule(
            Duration::from_millis(TICK_INTERVAL_MS),
            Wake::Tick {
                generation: self.tick_generation,
            },
        );
    }

    fn begin_announcement(&mut self, color: String) {
        if self.announcement.take().is_some() {
            self.surface.end_flash();
        }

        self.fade_generation += 1;
        let announcement = Announcement::new(color, &self.fade);
        self.surface.begin_flash(announcement.color());
        self.scheduler.schedule(
            announcement.interval(),
            Wake::Fade {
                generation: self.fade_generation,
            },
        );
        self.announcement = Some(announcement);
    }

    fn advance_fade(&mut self) {
        let Some(announcement) = self.announcement.as_mut() else {
            return;
        };

        match announcement.next_opacity() {
            Some(opacity) => {
                self.surface.set_flash_opacity(opacity);
                if announcement.is_finished() {
                    self.finish_announcement();
                } else {
                    let interval = announcement.interval();
                    self.scheduler.schedule(
                        interval,
                        Wake::Fade {
                            generation: self.fade_generation,
                        },
                    );
                }
            }
            None => self.finish_announcement(),
        }
    }

    fn finish_announcement(&mut self) {
        self.announcement = None;
        self.surface.end_flash();
        debug!("Transition flash finished");

        if self.cycle.is_running() {
            self.tick();
        } else {
            self.show_remaining();
            self.publish();
        }
    }

    fn show_remaining(&mut self) {
        self.surface
            .show_time(&format_clock(self.cycle.remaining_seconds()));
    }

    fn paint_cosmetics(&mut self) {
        let config = self.store.config();
        self.surface.set_text_color(config.color(self.cycle.phase()));
        self.surface.set_transparency(config.transparency);
        self.surface.set_font_size(config.font_size);
        self.surface.set_allow_move(config.allow_move);
    }

    fn publish(&self) {
        self.status.publish(StatusSnapshot {
            phase: self.cycle.phase(),
            remaining_seconds: self.cycle.remaining_seconds(),
            running: self.cycle.is_running(),
            visible: self.visible,
            flashing: self.announcement.is_some(),
            config: self.store.config().clone(),
        });
    }
}

impl<S: Surface> PomodoroCore<S, TimerQueue> {
    /// Advance the queue clock to `now` and run every wake-up that is due
    pub fn run_due(&mut self, now: Instant) {
        self.scheduler.advance_to(now);
        while let Some(wake) = self.scheduler.pop_due() {
            self.handle_wake(wake);
        }
    }

    /// Execute a command with the queue clock moved to `now`, so anything it
    /// schedules is measured from when it arrived
    pub fn handle_command_at(&mut self, command: Command, now: Instant) -> ControlFlow<()> {
        self.scheduler.advance_to(now);
        self.handle_command(command)
    }

    /// When the next scheduled wake-up is due, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }
}
