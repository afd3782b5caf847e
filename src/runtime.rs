//! Event loop for surfaces without their own windowing loop
//!
//! Sleeps until the next scheduled wake-up or the next command, whichever
//! comes first. The tray app drives the same core from tao's loop instead.

use crate::commands::CommandReceiver;
use crate::constants::IDLE_POLL_INTERVAL_MS;
use crate::scheduler::TimerQueue;
use crate::surface::Surface;
use crate::PomodoroCore;
use crossbeam_channel::select;
use log::{debug, info};
use std::ops::ControlFlow;
use std::time::{Duration, Instant};

/// Run until an exit command arrives or every sender is dropped
pub fn run<S: Surface>(core: &mut PomodoroCore<S, TimerQueue>, commands: &CommandReceiver) {
    info!("Event loop started");
    let mut running = true;
    while running {
        core.run_due(Instant::now());

        let wait = next_wait(core.next_deadline(), Instant::now());
        select! {
            recv(commands.channel()) -> command => match command {
                Ok(command) => {
                    // Drain anything queued behind it before sleeping again
                    running = core.handle_command_at(command, Instant::now()).is_continue()
                        && drain(core, commands).is_continue();
                }
                Err(_) => {
                    debug!("All command senders dropped");
                    core.exit();
                    running = false;
                }
            },
            default(wait) => {}
        }
    }
    info!("Event loop finished");
}

/// Drain queued commands without blocking; used by loops that own the wait
pub fn drain<S: Surface>(
    core: &mut PomodoroCore<S, TimerQueue>,
    commands: &CommandReceiver,
) -> ControlFlow<()> {
    while let Some(command) = commands.try_recv() {
        if core.handle_command_at(command, Instant::now()).is_break() {
            return ControlFlow::Break(());
        }
    }
    ControlFlow::Continue(())
}

/// How long to block before the next wake-up is due
pub fn next_wait(deadline: Option<Instant>, now: Instant) -> Duration {
    let idle = Duration::from_millis(IDLE_POLL_INTERVAL_MS);
    match deadline {
        Some(deadline) => deadline.saturating_duration_since(now).min(idle),
        None => idle,
    }
}
