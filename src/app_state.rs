use crate::config_file::Config;
use crate::cycle::Phase;
use parking_lot::Mutex;
use std::sync::Arc;

/// Read-only view of the timer published by the event thread
///
/// Background presences (tray menu, hotkeys, terminal input) read this to
/// label menus or prefill the settings editor. They never write to it and
/// never touch the cycle state; changes go through the command queue.
#[derive(Clone)]
pub struct AppStatus {
    inner: Arc<Mutex<StatusSnapshot>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    /// Phase currently counting down
    pub phase: Phase,
    /// Seconds left in the phase
    pub remaining_seconds: u64,
    /// Whether the countdown is live
    pub running: bool,
    /// Whether the overlay window is shown
    pub visible: bool,
    /// Whether a phase transition flash is playing
    pub flashing: bool,
    /// Configuration in effect
    pub config: Config,
}

impl AppStatus {
    pub fn new(snapshot: StatusSnapshot) -> Self {
        Self {
            inner: Arc::new(Mutex::new(snapshot)),
        }
    }

    /// Replace the published view (event thread only)
    pub fn publish(&self, snapshot: StatusSnapshot) {
        *self.inner.lock() = snapshot;
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.inner.lock().clone()
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock().running
    }

    pub fn is_visible(&self) -> bool {
        self.inner.lock().visible
    }

    pub fn phase(&self) -> Phase {
        self.inner.lock().phase
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.inner.lock().remaining_seconds
    }

    pub fn config(&self) -> Config {
        self.inner.lock().config.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn snapshot() -> StatusSnapshot {
        StatusSnapshot {
            phase: Phase::Work,
            remaining_seconds: 1500,
            running: false,
            visible: true,
            flashing: false,
            config: Config::default(),
        }
    }

    #[test]
    fn test_publish_replaces_view() {
        let status = AppStatus::new(snapshot());
        assert!(!status.is_running());

        status.publish(StatusSnapshot {
            running: true,
            remaining_seconds: 1499,
            ..snapshot()
        });
        assert!(status.is_running());
        assert_eq!(status.remaining_seconds(), 1499);
        assert_eq!(status.phase(), Phase::Work);
    }

    #[test]
    fn test_readers_on_other_threads_see_updates() {
        let status = AppStatus::new(snapshot());
        let reader = status.clone();

        status.publish(StatusSnapshot {
            phase: Phase::Break,
            ..snapshot()
        });

        let phase = thread::spawn(move || reader.phase()).join().unwrap();
        assert_eq!(phase, Phase::Break);
    }
}
