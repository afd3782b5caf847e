// Pomodoro CLI - terminal front end for the overlay timer
// Prints the countdown in place and reads commands from stdin

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use pomodoro_overlay::app_state::AppStatus;
use pomodoro_overlay::commands::{command_queue, Command, CommandSender};
use pomodoro_overlay::config::{self, SettingsInput};
use pomodoro_overlay::config_file::{Config, ConfigPatch, ConfigStore};
use pomodoro_overlay::constants::{COMMAND_QUEUE_CAPACITY, PHASE_MINS_MAX, PHASE_MINS_MIN};
use pomodoro_overlay::cycle::Phase;
use pomodoro_overlay::error::ValidationError;
use pomodoro_overlay::scheduler::TimerQueue;
use pomodoro_overlay::surface::Surface;
use pomodoro_overlay::{runtime, PomodoroCore};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Instant;

/// Pomodoro countdown that alternates work and break phases
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Pomodoro countdown that alternates work and break phases",
    long_about = "Pomodoro countdown that alternates work and break phases.

The remaining time is printed in place. When a phase ends the timer
announces the switch and keeps counting down the next phase.

COMMANDS (type while running):
  start | stop | toggle     Control the countdown
  hide | show               Pause or resume printing the countdown
  settings                  Show the current settings
  set <key> <value>         Edit a setting (work_mins, break_mins, work_color,
                            break_color, transparency, allow_move, font_size)
  apply                     Apply edited settings without saving
  save                      Apply edited settings and save them
  cancel                    Discard edited settings
  quit                      Exit

Settings are stored at:
  <config dir>/pomodoro-overlay/config.toml"
)]
struct Args {
    /// Start counting down immediately
    #[arg(short, long)]
    start: bool,

    /// Work phase length in minutes (1-1440, overrides config file)
    #[arg(long)]
    work_mins: Option<u64>,

    /// Break phase length in minutes (1-1440, overrides config file)
    #[arg(long)]
    break_mins: Option<u64>,

    /// Config file to read and save instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run interactive setup to edit and save the settings
    #[arg(long)]
    setup: bool,
}

/// Prints the countdown on one terminal line
struct TerminalSurface {
    phase: Phase,
    visible: bool,
    last_time: String,
}

impl TerminalSurface {
    fn new() -> Self {
        Self {
            phase: Phase::Work,
            visible: true,
            last_time: String::new(),
        }
    }

    fn redraw(&self) {
        if !self.visible {
            return;
        }
        print!("\r{:>5}  {}   ", self.phase.as_str(), self.last_time);
        let _ = io::stdout().flush();
    }
}

impl Surface for TerminalSurface {
    fn show_time(&mut self, text: &str) {
        self.last_time = text.to_string();
        self.redraw();
    }

    fn set_text_color(&mut self, color: &str) {
        debug!("Text color: {}", color);
    }

    fn set_transparency(&mut self, alpha: f32) {
        debug!("Transparency: {}", alpha);
    }

    fn set_font_size(&mut self, font_size: u32) {
        debug!("Font size: {}", font_size);
    }

    fn set_allow_move(&mut self, allowed: bool) {
        debug!("Allow move: {}", allowed);
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if visible {
            self.redraw();
        } else {
            println!();
        }
    }

    fn begin_flash(&mut self, color: &str) {
        println!("\n*** {} time! ({}) ***", self.phase, color);
    }

    fn set_flash_opacity(&mut self, _opacity: f32) {}

    fn end_flash(&mut self) {
        self.redraw();
    }

    fn open_settings(&mut self, config: &Config) {
        println!();
        println!("Settings");
        println!("========");
        for (key, value) in settings_rows(&SettingsInput::from_config(config)) {
            println!("  {:<13} {}", key, value);
        }
        println!("Edit with 'set <key> <value>', then 'apply' or 'save'.");
    }

    fn phase_changed(&mut self, phase: Phase) {
        self.phase = phase;
    }

    fn running_changed(&mut self, running: bool) {
        if !running {
            println!("\n(paused)");
        }
    }
}

fn settings_rows(input: &SettingsInput) -> [(&'static str, &str); 7] {
    [
        ("work_mins", &input.work_mins),
        ("break_mins", &input.break_mins),
        ("work_color", &input.work_color),
        ("break_color", &input.break_color),
        ("transparency", &input.transparency),
        ("allow_move", &input.allow_move),
        ("font_size", &input.font_size),
    ]
}

/// Edits collected from stdin until applied or discarded
struct Editor {
    status: AppStatus,
    draft: Option<SettingsInput>,
}

impl Editor {
    fn draft(&mut self) -> &mut SettingsInput {
        let status = &self.status;
        self.draft
            .get_or_insert_with(|| SettingsInput::from_config(&status.config()))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ValidationError> {
        self.draft().set(key, value)
    }

    /// Validate the draft; on failure the draft is kept for correction
    fn finish(&mut self) -> Result<Option<Config>, ValidationError> {
        let Some(draft) = self.draft.as_ref() else {
            return Ok(None);
        };
        let config = draft.validate()?;
        self.draft = None;
        Ok(Some(config))
    }
}

/// Read commands from stdin until EOF or `quit`
fn read_commands(sender: CommandSender, status: AppStatus) {
    let mut editor = Editor {
        status,
        draft: None,
    };

    for line in io::stdin().lock().lines() {
        let Ok(line) = line else {
            break;
        };
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            continue;
        };

        let command = match word {
            "start" => Command::Start,
            "stop" | "pause" => Command::Stop,
            "toggle" => Command::Toggle,
            "hide" => Command::Hide,
            "show" => Command::Show,
            "settings" => Command::OpenSettings,
            "quit" | "exit" => {
                sender.send(Command::Exit);
                return;
            }
            "set" => {
                let (Some(key), value) = (words.next(), words.collect::<Vec<_>>().join(" "))
                else {
                    println!("Usage: set <key> <value>");
                    continue;
                };
                if let Err(e) = editor.set(key, &value) {
                    println!("{}", e);
                }
                continue;
            }
            "apply" | "save" => match editor.finish() {
                Ok(Some(config)) => Command::ApplySettings {
                    config,
                    persist: word == "save",
                },
                Ok(None) => {
                    println!("No pending changes");
                    continue;
                }
                Err(e) => {
                    println!("{}", e);
                    continue;
                }
            },
            "cancel" => {
                editor.draft = None;
                continue;
            }
            other => {
                println!("Unknown command: {}", other);
                continue;
            }
        };
        sender.send(command);
    }
    debug!("stdin closed");
}

/// Helper function to prompt for one field, keeping the current value on empty input
fn prompt_field(prompt: &str, current: &str) -> Result<Option<String>> {
    print!("{} [{}]: ", prompt, current);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    if input.is_empty() {
        Ok(None)
    } else {
        Ok(Some(input.to_string()))
    }
}

/// Run interactive setup to edit and save the settings
fn run_setup(path: PathBuf) -> Result<()> {
    println!("Pomodoro Overlay Setup");
    println!("======================\n");

    let mut store = ConfigStore::load(path);
    let mut input = SettingsInput::from_config(store.config());

    let prompts = [
        ("work_mins", "Work minutes"),
        ("break_mins", "Break minutes"),
        ("work_color", "Work text color"),
        ("break_color", "Break text color"),
        ("transparency", "Overlay opacity (0.0-1.0)"),
        ("allow_move", "Allow dragging the overlay (true/false)"),
        ("font_size", "Font size"),
    ];

    for (key, prompt) in prompts {
        loop {
            let current = settings_rows(&input)
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
                .unwrap_or_default();
            let Some(value) = prompt_field(prompt, &current)? else {
                break;
            };

            let mut candidate = input.clone();
            candidate.set(key, &value)?;
            match candidate.validate() {
                Ok(_) => {
                    input = candidate;
                    break;
                }
                Err(e) => println!("  {}", e),
            }
        }
    }

    let config = input.validate().context("Invalid settings")?;
    store.replace(config);
    store.persist().context("Failed to save configuration")?;

    if let Some(path) = store.path() {
        println!("\nConfiguration saved to: {}", path.display());
    }
    println!("Setup complete!");
    Ok(())
}

/// Command-line duration overrides, validated like the settings editor
fn cli_overrides(args: &Args) -> ConfigPatch {
    let valid = |flag: &str, value: Option<u64>| match value {
        Some(mins) if (PHASE_MINS_MIN..=PHASE_MINS_MAX).contains(&mins) => {
            info!("{} set via command line: {} minutes", flag, mins);
            Some(mins)
        }
        Some(mins) => {
            warn!(
                "Invalid {} value: {} (must be {}-{} minutes). Using config file or environment variable.",
                flag, mins, PHASE_MINS_MIN, PHASE_MINS_MAX
            );
            None
        }
        None => None,
    };

    ConfigPatch {
        work_mins: valid("--work-mins", args.work_mins),
        break_mins: valid("--break-mins", args.break_mins),
        ..Default::default()
    }
}

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();
    let path = args.config.clone().unwrap_or_else(Config::config_path);

    // Handle setup command
    if args.setup {
        return run_setup(path);
    }

    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting Pomodoro Overlay (terminal)");

    // Precedence: CLI arg > env var > config file
    let mut store = ConfigStore::load(path);
    store.merge(config::env_overrides());
    store.merge(cli_overrides(&args));

    let mut core = PomodoroCore::new(store, TerminalSurface::new(), TimerQueue::new(Instant::now()));

    let (sender, receiver) = command_queue(COMMAND_QUEUE_CAPACITY);
    let status = core.status();
    thread::Builder::new()
        .name("stdin-commands".into())
        .spawn(move || read_commands(sender, status))
        .context("Failed to spawn stdin reader")?;

    if args.start {
        info!("Starting countdown (--start flag)");
        core.start();
    } else {
        info!("Type 'start' to begin, 'quit' to exit");
    }

    runtime::run(&mut core, &receiver);

    println!();
    info!("CLI shutdown complete");
    Ok(())
}
