// Pomodoro Tray App - system tray front end for the overlay timer
// This binary owns the tao event loop; the tray menu and global hotkeys
// feed it commands

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use pomodoro_overlay::commands::{command_queue, Command, CommandSender};
use pomodoro_overlay::config::{self, SettingsInput};
use pomodoro_overlay::config_file::{Config, ConfigStore};
use pomodoro_overlay::constants::{
    COMMAND_QUEUE_CAPACITY, FLASH_PEAK_OPACITY, NOTIFICATION_TIMEOUT_MS,
};
use pomodoro_overlay::cycle::Phase;
use pomodoro_overlay::error::ResourceError;
use pomodoro_overlay::hotkeys::{HotkeyListener, HotkeyManager};
use pomodoro_overlay::scheduler::TimerQueue;
use pomodoro_overlay::surface::Surface;
use pomodoro_overlay::{runtime, PomodoroCore};
use std::env;
use std::path::PathBuf;
use std::time::Instant;
use tao::event::{Event, StartCause};
use tao::event_loop::{ControlFlow, EventLoopBuilder};
use tray_icon::menu::{Menu, MenuEvent, MenuItem, PredefinedMenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const ICON_SIZE: u32 = 32;
const ICON_PATH: &str = "icon.png";

#[derive(Debug, Clone, Copy)]
enum UserEvent {
    /// A command was queued from another thread
    Wake,
}

/// Menu entries whose labels follow the timer state
struct TrayMenu {
    visibility_item: MenuItem,
    start_item: MenuItem,
}

/// Paints the timer into the tray: countdown in the title and tooltip,
/// phase color and flash pulse in the icon
struct TraySurface {
    tray: TrayIcon,
    menu: TrayMenu,
    config_path: PathBuf,
    phase: Phase,
    visible: bool,
    last_time: String,
    text_color: [u8; 3],
    flash_color: [u8; 3],
}

impl TraySurface {
    fn paint_icon(&self, rgb: [u8; 3], alpha: f32) {
        let icon = match solid_icon(rgb, alpha) {
            Ok(icon) => icon,
            Err(e) => {
                error!("Failed to build tray icon: {:#}", e);
                return;
            }
        };
        if let Err(e) = self.tray.set_icon(Some(icon)) {
            error!("Failed to update tray icon: {}", e);
        }
    }

    fn paint_time(&self) {
        let (title, tooltip) = tray_text(self.phase, &self.last_time, self.visible);
        self.tray.set_title(title);
        if let Err(e) = self.tray.set_tooltip(Some(tooltip)) {
            debug!("Failed to update tooltip: {}", e);
        }
    }
}

impl Surface for TraySurface {
    fn show_time(&mut self, text: &str) {
        self.last_time = text.to_string();
        self.paint_time();
    }

    fn set_text_color(&mut self, color: &str) {
        self.text_color = parse_color(color).unwrap_or_else(|| {
            warn!("Unrecognized color '{}', using white", color);
            [255, 255, 255]
        });
        self.paint_icon(self.text_color, 1.0);
    }

    // The tray has no overlay to size, fade or drag
    fn set_transparency(&mut self, alpha: f32) {
        debug!("Transparency {} has no effect in the tray", alpha);
    }

    fn set_font_size(&mut self, font_size: u32) {
        debug!("Font size {} has no effect in the tray", font_size);
    }

    fn set_allow_move(&mut self, allowed: bool) {
        debug!("Allow move {} has no effect in the tray", allowed);
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.paint_time();
        let label = if visible { "Hide Timer" } else { "Show Timer" };
        self.menu.visibility_item.set_text(label);
    }

    fn begin_flash(&mut self, color: &str) {
        self.flash_color = parse_color(color).unwrap_or(self.text_color);
        self.paint_icon(self.flash_color, 0.0);

        if let Err(e) = notify_rust::Notification::new()
            .summary("Pomodoro Overlay")
            .body(&format!("{} time!", self.phase))
            .timeout(notify_rust::Timeout::Milliseconds(NOTIFICATION_TIMEOUT_MS))
            .show()
        {
            warn!("Failed to show notification: {}", e);
        }
    }

    fn set_flash_opacity(&mut self, opacity: f32) {
        self.paint_icon(self.flash_color, opacity / FLASH_PEAK_OPACITY);
    }

    fn end_flash(&mut self) {
        self.paint_icon(self.text_color, 1.0);
    }

    fn open_settings(&mut self, config: &Config) {
        if !self.config_path.exists() {
            if let Err(e) = config.save_to_path(&self.config_path) {
                error!("Failed to write settings file: {:#}", e);
                return;
            }
        }
        info!("Opening settings file: {}", self.config_path.display());
        if let Err(e) = open_in_editor(&self.config_path) {
            error!("Failed to open settings file: {:#}", e);
        }
    }

    fn phase_changed(&mut self, phase: Phase) {
        self.phase = phase;
    }

    fn running_changed(&mut self, running: bool) {
        let label = if running { "Pause" } else { "Start" };
        self.menu.start_item.set_text(label);
    }

    fn release(&mut self) -> Result<(), ResourceError> {
        self.tray
            .set_visible(false)
            .map_err(|e| ResourceError::new("tray icon", e))
    }
}

/// Tray title and tooltip for the countdown; a hidden timer has no title
fn tray_text(phase: Phase, time: &str, visible: bool) -> (Option<&str>, String) {
    if visible {
        (Some(time), format!("Pomodoro - {} {}", phase, time))
    } else {
        (None, format!("Pomodoro - {} (timer hidden)", phase))
    }
}

/// Parse `#RRGGBB`, `#RGB` or a common color name
fn parse_color(color: &str) -> Option<[u8; 3]> {
    let color = color.trim().to_ascii_lowercase();
    if let Some(hex) = color.strip_prefix('#') {
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        return match hex.len() {
            6 => Some([channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?]),
            3 => {
                let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Some([short(0)?, short(1)?, short(2)?])
            }
            _ => None,
        };
    }

    let rgb = match color.as_str() {
        "white" => [255, 255, 255],
        "black" => [0, 0, 0],
        "red" => [255, 0, 0],
        "green" => [0, 128, 0],
        "blue" => [0, 0, 255],
        "yellow" => [255, 255, 0],
        "orange" => [255, 165, 0],
        "tomato" => [255, 99, 71],
        "gray" | "grey" => [128, 128, 128],
        _ => return None,
    };
    Some(rgb)
}

/// Square icon of one color; `alpha` is clamped to 0.0-1.0
fn solid_icon(rgb: [u8; 3], alpha: f32) -> Result<Icon> {
    let alpha = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    let image = image::RgbaImage::from_pixel(
        ICON_SIZE,
        ICON_SIZE,
        image::Rgba([rgb[0], rgb[1], rgb[2], alpha]),
    );
    Icon::from_rgba(image.into_raw(), ICON_SIZE, ICON_SIZE).context("Invalid icon data")
}

/// Load `icon.png` from the working directory, falling back to a red square
fn load_tray_icon() -> Result<Icon> {
    match image::open(ICON_PATH) {
        Ok(image) => {
            let image = image.to_rgba8();
            let (width, height) = image.dimensions();
            info!("Loaded tray icon from {}", ICON_PATH);
            Icon::from_rgba(image.into_raw(), width, height).context("Invalid icon.png")
        }
        Err(e) => {
            debug!("No usable {} ({}); using a red square", ICON_PATH, e);
            solid_icon([255, 0, 0], 1.0)
        }
    }
}

/// Open a file with the desktop's default application
fn open_in_editor(path: &std::path::Path) -> Result<()> {
    use std::process::Command as Process;

    let mut process = if cfg!(target_os = "macos") {
        Process::new("open")
    } else if cfg!(target_os = "windows") {
        let mut process = Process::new("cmd");
        process.args(["/C", "start", ""]);
        process
    } else {
        Process::new("xdg-open")
    };

    process
        .arg(path)
        .spawn()
        .with_context(|| format!("Failed to launch editor for {}", path.display()))?;
    Ok(())
}

/// Re-read the settings file and queue it for the timer if valid
fn reload_settings(path: &std::path::Path, sender: &CommandSender) {
    let config = match Config::read_from_path(path) {
        Ok(Some(config)) => config,
        Ok(None) => {
            warn!("Settings file {} does not exist", path.display());
            return;
        }
        Err(e) => {
            error!("{}", e);
            return;
        }
    };

    match SettingsInput::from_config(&config).validate() {
        Ok(config) => {
            info!("Reloaded settings from {}", path.display());
            sender.send(Command::ApplySettings {
                config,
                persist: false,
            });
        }
        Err(e) => error!("Settings not applied: {}", e),
    }
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting Pomodoro Overlay Tray App v{}", VERSION);

    let config_path = Config::config_path();
    let mut store = ConfigStore::load(config_path.clone());
    store.merge(config::env_overrides());
    let start_immediately = env::args().any(|arg| arg == "--start");

    // Create event loop for tray app
    let event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();
    let proxy = parking_lot::Mutex::new(event_loop.create_proxy());

    let (sender, receiver) = command_queue(COMMAND_QUEUE_CAPACITY);
    let sender = sender.with_waker(move || {
        let _ = proxy.lock().send_event(UserEvent::Wake);
    });

    // Build tray menu
    let visibility_item = MenuItem::new("Hide Timer", true, None);
    let start_item = MenuItem::new("Start", true, None);
    let settings_item = MenuItem::new("Settings", true, None);
    let reload_item = MenuItem::new("Reload Settings", true, None);
    let separator = PredefinedMenuItem::separator();
    let exit_item = MenuItem::new("Exit", true, None);

    let menu = Menu::new();
    menu.append(&visibility_item).context("Failed to add hide/show menu item")?;
    menu.append(&start_item).context("Failed to add start menu item")?;
    menu.append(&settings_item).context("Failed to add settings menu item")?;
    menu.append(&reload_item).context("Failed to add reload menu item")?;
    menu.append(&separator).context("Failed to add separator")?;
    menu.append(&exit_item).context("Failed to add exit menu item")?;

    // Create tray icon
    let tray = TrayIconBuilder::new()
        .with_menu(Box::new(menu))
        .with_tooltip("Pomodoro Overlay")
        .with_icon(load_tray_icon()?)
        .build()
        .context("Failed to create tray icon")?;

    // Forward menu clicks to the event thread
    let visibility_id = visibility_item.id().clone();
    let start_id = start_item.id().clone();
    let settings_id = settings_item.id().clone();
    let reload_id = reload_item.id().clone();
    let exit_id = exit_item.id().clone();
    let menu_sender = sender.clone();
    let reload_path = config_path.clone();
    MenuEvent::set_event_handler(Some(move |event: MenuEvent| {
        let id = event.id;
        if id == visibility_id {
            menu_sender.send(Command::ToggleVisibility);
        } else if id == start_id {
            menu_sender.send(Command::Toggle);
        } else if id == settings_id {
            menu_sender.send(Command::OpenSettings);
        } else if id == reload_id {
            reload_settings(&reload_path, &menu_sender);
        } else if id == exit_id {
            info!("Exit menu item clicked");
            menu_sender.send(Command::Exit);
        }
    }));

    let surface = TraySurface {
        tray,
        menu: TrayMenu {
            visibility_item,
            start_item,
        },
        config_path,
        phase: Phase::Work,
        visible: true,
        last_time: String::new(),
        text_color: [255, 255, 255],
        flash_color: [255, 255, 255],
    };

    let mut core = PomodoroCore::new(store, surface, TimerQueue::new(Instant::now()));

    // Global hotkeys are optional; the menu still works without them
    match HotkeyManager::new().and_then(|mut manager| {
        manager.register_toggle_timer_hotkey()?;
        manager.register_toggle_visibility_hotkey()?;
        HotkeyListener::spawn(manager, sender.clone(), core.shutdown_signal())
    }) {
        Ok(listener) => core.register_presence(Box::new(listener)),
        Err(e) => warn!("Global hotkeys unavailable: {:#}", e),
    }
    drop(sender);

    info!("Tray icon created, running event loop");

    // Run event loop
    event_loop.run(move |event, _, control_flow| {
        match event {
            Event::NewEvents(StartCause::Init) => {
                if start_immediately {
                    info!("Starting countdown (--start flag)");
                    core.start();
                }
            }
            Event::UserEvent(UserEvent::Wake) => {}
            _ => {}
        }

        core.run_due(Instant::now());
        if runtime::drain(&mut core, &receiver).is_break() {
            info!("Tray app shutting down");
            *control_flow = ControlFlow::Exit;
            return;
        }

        *control_flow = match core.next_deadline() {
            Some(deadline) => ControlFlow::WaitUntil(deadline),
            None => ControlFlow::Wait,
        };
    });
}
