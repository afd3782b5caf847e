use crate::commands::{Command, CommandSender};
use crate::constants::HOTKEY_POLL_INTERVAL_MS;
use crate::error::ResourceError;
use crate::lifecycle::{Presence, ShutdownSignal};
use anyhow::{Context, Result};
use global_hotkey::{
    hotkey::{Code, HotKey, Modifiers},
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
};
use log::{debug, info};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Ids of the registered hotkeys, copied into the listener thread
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HotkeyBindings {
    pub toggle_timer: Option<u32>,
    pub toggle_visibility: Option<u32>,
}

impl HotkeyBindings {
    /// Map a pressed hotkey to the command it triggers
    pub fn command_for(&self, event_id: u32) -> Option<Command> {
        if self.toggle_timer == Some(event_id) {
            Some(Command::Toggle)
        } else if self.toggle_visibility == Some(event_id) {
            Some(Command::ToggleVisibility)
        } else {
            None
        }
    }
}

pub struct HotkeyManager {
    manager: GlobalHotKeyManager,
    toggle_timer_hotkey: Option<HotKey>,
    toggle_visibility_hotkey: Option<HotKey>,
}

impl HotkeyManager {
    pub fn new() -> Result<Self> {
        let manager = GlobalHotKeyManager::new()
            .context("Failed to create global hotkey manager")?;

        Ok(Self {
            manager,
            toggle_timer_hotkey: None,
            toggle_visibility_hotkey: None,
        })
    }

    /// Register the start/pause hotkey (Ctrl+Alt+Shift+P)
    pub fn register_toggle_timer_hotkey(&mut self) -> Result<()> {
        let hotkey = HotKey::new(
            Some(Modifiers::CONTROL | Modifiers::ALT | Modifiers::SHIFT),
            Code::KeyP,
        );

        self.manager
            .register(hotkey)
            .context("Failed to register start/pause hotkey")?;

        self.toggle_timer_hotkey = Some(hotkey);
        info!("Start/pause hotkey registered: Ctrl+Alt+Shift+P");
        Ok(())
    }

    /// Register the hide/show hotkey (Ctrl+Alt+Shift+H)
    pub fn register_toggle_visibility_hotkey(&mut self) -> Result<()> {
        let hotkey = HotKey::new(
            Some(Modifiers::CONTROL | Modifiers::ALT | Modifiers::SHIFT),
            Code::KeyH,
        );

        self.manager
            .register(hotkey)
            .context("Failed to register hide/show hotkey")?;

        self.toggle_visibility_hotkey = Some(hotkey);
        info!("Hide/show hotkey registered: Ctrl+Alt+Shift+H");
        Ok(())
    }

    pub fn bindings(&self) -> HotkeyBindings {
        HotkeyBindings {
            toggle_timer: self.toggle_timer_hotkey.map(|hk| hk.id()),
            toggle_visibility: self.toggle_visibility_hotkey.map(|hk| hk.id()),
        }
    }

    /// Unregister all hotkeys
    pub fn unregister_all(&mut self) -> Result<()> {
        if let Some(hotkey) = self.toggle_timer_hotkey.take() {
            self.manager.unregister(hotkey)?;
        }
        if let Some(hotkey) = self.toggle_visibility_hotkey.take() {
            self.manager.unregister(hotkey)?;
        }
        Ok(())
    }
}

/// Background thread turning hotkey presses into commands
pub struct HotkeyListener {
    manager: HotkeyManager,
    thread: Option<JoinHandle<()>>,
}

impl HotkeyListener {
    /// Spawn the listener; it exits once `signal` is triggered
    pub fn spawn(
        manager: HotkeyManager,
        sender: CommandSender,
        signal: ShutdownSignal,
    ) -> Result<Self> {
        let bindings = manager.bindings();
        let thread = thread::Builder::new()
            .name("hotkey-listener".into())
            .spawn(move || listen(bindings, sender, signal))
            .context("Failed to spawn hotkey listener thread")?;

        Ok(Self {
            manager,
            thread: Some(thread),
        })
    }
}

fn listen(bindings: HotkeyBindings, sender: CommandSender, signal: ShutdownSignal) {
    let receiver = GlobalHotKeyEvent::receiver();
    let poll = Duration::from_millis(HOTKEY_POLL_INTERVAL_MS);

    while !signal.is_triggered() {
        let Ok(event) = receiver.recv_timeout(poll) else {
            continue;
        };
        if event.state != HotKeyState::Pressed {
            continue;
        }
        if let Some(command) = bindings.command_for(event.id) {
            info!("Hotkey triggered: {:?}", command);
            sender.send(command);
        }
    }
    debug!("Hotkey listener stopped");
}

impl Presence for HotkeyListener {
    fn name(&self) -> &str {
        "hotkey listener"
    }

    fn stop(&mut self) -> Result<(), ResourceError> {
        let unregistered = self
            .manager
            .unregister_all()
            .map_err(|e| ResourceError::new(self.name(), format!("{:#}", e)));

        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|_| ResourceError::new("hotkey listener", "listener thread panicked"))?;
        }
        unregistered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings_map_ids_to_commands() {
        let bindings = HotkeyBindings {
            toggle_timer: Some(7),
            toggle_visibility: Some(9),
        };
        assert_eq!(bindings.command_for(7), Some(Command::Toggle));
        assert_eq!(bindings.command_for(9), Some(Command::ToggleVisibility));
        assert_eq!(bindings.command_for(8), None);
    }

    #[test]
    fn test_unregistered_bindings_match_nothing() {
        let bindings = HotkeyBindings::default();
        assert_eq!(bindings.command_for(0), None);
    }
}
