//! Intents marshaled onto the event thread
//!
//! Background presences hold a [`CommandSender`]; only the event thread holds
//! the [`CommandReceiver`]. The queue is bounded and senders never block: a
//! full queue drops the intent with a warning.

use crate::config_file::Config;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use log::{debug, warn};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Stop,
    Toggle,
    OpenSettings,
    Hide,
    Show,
    ToggleVisibility,
    /// Validated snapshot from the settings editor; `persist` also writes it to disk
    ApplySettings { config: Config, persist: bool },
    Exit,
}

type Waker = Arc<dyn Fn() + Send + Sync>;

/// Cloneable, non-blocking handle for enqueuing commands
#[derive(Clone)]
pub struct CommandSender {
    sender: Sender<Command>,
    waker: Option<Waker>,
}

impl CommandSender {
    /// Call `waker` after every accepted command, e.g. to nudge a GUI event loop
    pub fn with_waker(mut self, waker: impl Fn() + Send + Sync + 'static) -> Self {
        self.waker = Some(Arc::new(waker));
        self
    }

    /// Enqueue a command. Returns false if it was dropped.
    pub fn send(&self, command: Command) -> bool {
        match self.sender.try_send(command) {
            Ok(()) => {
                if let Some(waker) = &self.waker {
                    waker();
                }
                true
            }
            Err(TrySendError::Full(command)) => {
                warn!("Command queue full, dropping {:?}", command);
                false
            }
            Err(TrySendError::Disconnected(command)) => {
                debug!("Event thread gone, dropping {:?}", command);
                false
            }
        }
    }
}

pub struct CommandReceiver {
    receiver: Receiver<Command>,
}

impl CommandReceiver {
    pub fn try_recv(&self) -> Option<Command> {
        self.receiver.try_recv().ok()
    }

    /// Underlying channel, for waiting on it in `select!`
    pub fn channel(&self) -> &Receiver<Command> {
        &self.receiver
    }
}

/// Create a bounded command queue
pub fn command_queue(capacity: usize) -> (CommandSender, CommandReceiver) {
    let (sender, receiver) = bounded(capacity);
    (
        CommandSender {
            sender,
            waker: None,
        },
        CommandReceiver { receiver },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_commands_arrive_in_order() {
        let (sender, receiver) = command_queue(8);
        assert!(sender.send(Command::Start));
        assert!(sender.send(Command::Stop));

        assert_eq!(receiver.try_recv(), Some(Command::Start));
        assert_eq!(receiver.try_recv(), Some(Command::Stop));
        assert_eq!(receiver.try_recv(), None);
    }

    #[test]
    fn test_full_queue_drops_without_blocking() {
        let (sender, receiver) = command_queue(1);
        assert!(sender.send(Command::Toggle));
        assert!(!sender.send(Command::Toggle));

        assert_eq!(receiver.try_recv(), Some(Command::Toggle));
        assert_eq!(receiver.try_recv(), None);
    }

    #[test]
    fn test_send_from_other_thread_wakes() {
        let woken = Arc::new(AtomicUsize::new(0));
        let counter = woken.clone();
        let (sender, receiver) = command_queue(8);
        let sender = sender.with_waker(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        thread::spawn(move || {
            sender.send(Command::Exit);
        })
        .join()
        .unwrap();

        assert_eq!(
            receiver.channel().recv_timeout(Duration::from_millis(100)),
            Ok(Command::Exit)
        );
        assert_eq!(woken.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disconnected_receiver() {
        let (sender, receiver) = command_queue(8);
        drop(sender);
        assert!(receiver
            .channel()
            .recv_timeout(Duration::from_millis(10))
            .is_err());
        assert_eq!(receiver.try_recv(), None);
    }
}
