mod common;

use common::{config, core, core_at, run_until, Paint};
use pomodoro_overlay::commands::{command_queue, Command};
use pomodoro_overlay::error::ResourceError;
use pomodoro_overlay::lifecycle::{ExitOutcome, Lifecycle, Presence, ShutdownSignal};
use pomodoro_overlay::runtime;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Presence that counts stops and optionally fails them
struct CountingPresence {
    name: String,
    stops: Arc<AtomicUsize>,
    signal: ShutdownSignal,
    saw_signal: Arc<AtomicUsize>,
    fail: bool,
}

impl CountingPresence {
    fn new(name: &str, signal: ShutdownSignal, fail: bool) -> (Self, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let stops = Arc::new(AtomicUsize::new(0));
        let saw_signal = Arc::new(AtomicUsize::new(0));
        let presence = Self {
            name: name.to_string(),
            stops: stops.clone(),
            signal,
            saw_signal: saw_signal.clone(),
            fail,
        };
        (presence, stops, saw_signal)
    }
}

impl Presence for CountingPresence {
    fn name(&self) -> &str {
        &self.name
    }

    fn stop(&mut self) -> Result<(), ResourceError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        if self.signal.is_triggered() {
            self.saw_signal.fetch_add(1, Ordering::SeqCst);
        }
        if self.fail {
            return Err(ResourceError::new(self.name.clone(), "already released"));
        }
        Ok(())
    }
}

#[test]
fn test_exit_twice_is_harmless() {
    let mut core = core(25, 5);
    assert_eq!(core.exit(), ExitOutcome::Terminate);
    assert_eq!(core.exit(), ExitOutcome::AlreadyExited);
    assert_eq!(core.surface().count(|p| *p == Paint::Release), 1);
}

#[test]
fn test_exit_stops_presences_after_signaling() {
    let mut core = core(25, 5);
    let (presence, stops, saw_signal) =
        CountingPresence::new("tray menu", core.shutdown_signal(), false);
    core.register_presence(Box::new(presence));

    assert_eq!(core.exit(), ExitOutcome::Terminate);
    assert_eq!(stops.load(Ordering::SeqCst), 1);
    assert_eq!(saw_signal.load(Ordering::SeqCst), 1);

    core.exit();
    assert_eq!(stops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_failing_presence_does_not_block_exit() {
    let mut lifecycle = Lifecycle::new();
    let (broken, broken_stops, _) = CountingPresence::new("hotkeys", lifecycle.signal(), true);
    let (healthy, healthy_stops, _) = CountingPresence::new("tray", lifecycle.signal(), false);
    lifecycle.register(Box::new(broken));
    lifecycle.register(Box::new(healthy));

    let (outcome, failures) = lifecycle.exit();
    assert_eq!(outcome, ExitOutcome::Terminate);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].presence, "hotkeys");
    assert_eq!(broken_stops.load(Ordering::SeqCst), 1);
    assert_eq!(healthy_stops.load(Ordering::SeqCst), 1);
    assert!(lifecycle.has_exited());
    assert!(lifecycle.signal().is_triggered());
}

#[test]
fn test_surface_release_failure_still_terminates() {
    let mut core = core(25, 5);
    core.surface_mut().fail_release = true;
    assert_eq!(core.exit(), ExitOutcome::Terminate);
    assert_eq!(core.exit(), ExitOutcome::AlreadyExited);
}

#[test]
fn test_exit_halts_countdown_and_flash() {
    let epoch = Instant::now();
    let mut core = core_at(config(1, 1), epoch);
    core.start();
    run_until(&mut core, epoch + Duration::from_secs(60));
    assert!(core.announcement().is_some());

    core.exit();
    assert!(!core.is_running());
    assert!(core.announcement().is_none());

    let frozen = core.cycle_state().clone();
    run_until(&mut core, epoch + Duration::from_secs(120));
    assert_eq!(core.cycle_state(), &frozen);
    assert!(core.surface().flash_opacities().is_empty());
}

#[test]
fn test_exit_command_breaks_loop() {
    let mut core = core(25, 5);
    assert!(core.handle_command(Command::Start).is_continue());
    assert!(core.handle_command(Command::Exit).is_break());
    assert!(core.shutdown_signal().is_triggered());
}

#[test]
fn test_runtime_runs_commands_from_other_thread() {
    let mut core = core(25, 5);
    let (sender, receiver) = command_queue(8);

    let worker = thread::spawn(move || {
        sender.send(Command::Start);
        sender.send(Command::Hide);
        sender.send(Command::Exit);
    });

    runtime::run(&mut core, &receiver);
    worker.join().unwrap();

    assert!(!core.is_visible());
    assert!(core.shutdown_signal().is_triggered());
    assert!(core.surface().paints.contains(&Paint::Running(true)));
}

#[test]
fn test_runtime_exits_when_senders_drop() {
    let mut core = core(25, 5);
    let (sender, receiver) = command_queue(8);
    drop(sender);

    runtime::run(&mut core, &receiver);
    assert!(core.shutdown_signal().is_triggered());
    assert_eq!(core.exit(), ExitOutcome::AlreadyExited);
}
