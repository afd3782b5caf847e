//! Exit protocol
//!
//! `exit()` signals background presences to stop, stops each of them, and
//! then reports that the event loop may terminate. Failures while stopping a
//! presence are logged and never prevent termination. Calling it again is a
//! no-op.

use crate::error::ResourceError;
use log::{error, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag background threads poll to learn the app is shutting down
#[derive(Clone, Default)]
pub struct ShutdownSignal {
    flag: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Something running beside the event loop that must be torn down on exit
pub trait Presence {
    fn name(&self) -> &str;

    /// Stop and release resources. Called at most once.
    fn stop(&mut self) -> Result<(), ResourceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// First call: presences are down, terminate the event loop
    Terminate,
    /// Exit already ran; nothing was done
    AlreadyExited,
}

pub struct Lifecycle {
    signal: ShutdownSignal,
    presences: Vec<Box<dyn Presence>>,
    exited: bool,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            signal: ShutdownSignal::new(),
            presences: Vec::new(),
            exited: false,
        }
    }

    /// Signal handed to background threads
    pub fn signal(&self) -> ShutdownSignal {
        self.signal.clone()
    }

    pub fn register(&mut self, presence: Box<dyn Presence>) {
        info!("Registered background presence: {}", presence.name());
        self.presences.push(presence);
    }

    pub fn has_exited(&self) -> bool {
        self.exited
    }

    /// Run the exit protocol once; every failure is collected, not raised
    pub fn exit(&mut self) -> (ExitOutcome, Vec<ResourceError>) {
        if self.exited {
            return (ExitOutcome::AlreadyExited, Vec::new());
        }
        self.exited = true;

        info!("Exiting: signaling background presences");
        self.signal.trigger();

        let mut failures = Vec::new();
        for mut presence in self.presences.drain(..) {
            match presence.stop() {
                Ok(()) => info!("Stopped {}", presence.name()),
                Err(e) => {
                    error!("{}", e);
                    failures.push(e);
                }
            }
        }

        (ExitOutcome::Terminate, failures)
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
