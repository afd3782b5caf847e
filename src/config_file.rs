//! Configuration file management
//!
//! This module handles loading and saving the application configuration file
//! (durations, colors, transparency, font size and move permission). Missing
//! keys fall back to their defaults, so a partial or older file always loads.

use crate::constants::{
    BREAK_COLOR_DEFAULT, BREAK_MINS_DEFAULT, FONT_SIZE_DEFAULT, TRANSPARENCY_DEFAULT,
    WORK_COLOR_DEFAULT, WORK_MINS_DEFAULT,
};
use crate::cycle::Phase;
use crate::error::ConfigLoadError;
use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration stored in config.toml
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Work phase length in minutes (default: 25)
    #[serde(default = "default_work_mins")]
    pub work_mins: u64,
    /// Break phase length in minutes (default: 5)
    #[serde(default = "default_break_mins")]
    pub break_mins: u64,
    /// Label color while working (default: white)
    #[serde(default = "default_work_color")]
    pub work_color: String,
    /// Label and flash color while on break (default: #FF6347)
    #[serde(default = "default_break_color")]
    pub break_color: String,
    /// Overlay opacity, 0.0-1.0 (default: 0.1)
    #[serde(default = "default_transparency")]
    pub transparency: f32,
    /// Whether the overlay can be dragged (default: false)
    #[serde(default)]
    pub allow_move: bool,
    /// Countdown font size, 10-500 (default: 100)
    #[serde(default = "default_font_size")]
    pub font_size: u32,
}

fn default_work_mins() -> u64 {
    WORK_MINS_DEFAULT
}

fn default_break_mins() -> u64 {
    BREAK_MINS_DEFAULT
}

fn default_work_color() -> String {
    WORK_COLOR_DEFAULT.to_string()
}

fn default_break_color() -> String {
    BREAK_COLOR_DEFAULT.to_string()
}

fn default_transparency() -> f32 {
    TRANSPARENCY_DEFAULT
}

fn default_font_size() -> u32 {
    FONT_SIZE_DEFAULT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_mins: default_work_mins(),
            break_mins: default_break_mins(),
            work_color: default_work_color(),
            break_color: default_break_color(),
            transparency: default_transparency(),
            allow_move: false,
            font_size: default_font_size(),
        }
    }
}

impl Config {
    /// Length of the given phase in seconds
    pub fn duration_secs(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Work => self.work_mins.saturating_mul(60),
            Phase::Break => self.break_mins.saturating_mul(60),
        }
    }

    /// Label (and flash) color of the given phase
    pub fn color(&self, phase: Phase) -> &str {
        match phase {
            Phase::Work => &self.work_color,
            Phase::Break => &self.break_color,
        }
    }

    /// Upper bound for `remaining_seconds` under this configuration
    pub fn longest_phase_secs(&self) -> u64 {
        self.duration_secs(Phase::Work)
            .max(self.duration_secs(Phase::Break))
    }

    /// Get the standard config file path
    ///
    /// - macOS: `~/Library/Application Support/pomodoro-overlay/config.toml`
    /// - Linux: `~/.config/pomodoro-overlay/config.toml`
    /// - Windows: `%APPDATA%\pomodoro-overlay\config.toml`
    ///
    /// Falls back to the working directory when the platform has no config dir.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pomodoro-overlay")
            .join("config.toml")
    }

    /// Read and parse a config file
    ///
    /// Returns `Ok(None)` when the file does not exist. Absent keys take
    /// their defaults.
    pub fn read_from_path(path: &Path) -> Result<Option<Self>, ConfigLoadError> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Some(config))
    }

    /// Load config from a path, never failing
    ///
    /// - Missing file: all defaults
    /// - Existing file: parsed values, defaults for absent keys
    /// - Out-of-range value: warning logged, default for that key
    /// - Malformed file: warning logged, all defaults
    pub fn load_from_path(path: &Path) -> Self {
        match Self::read_from_path(path) {
            Ok(Some(config)) => {
                info!("Configuration loaded from: {}", path.display());
                config.sanitized()
            }
            Ok(None) => {
                info!(
                    "No configuration at {}, using defaults",
                    path.display()
                );
                Self::default()
            }
            Err(e) => {
                warn!("{}. Falling back to default configuration.", e);
                Self::default()
            }
        }
    }

    /// Write config to a path
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        info!("Configuration saved to: {}", path.display());
        Ok(())
    }
}

/// Partial update of a [`Config`]; every present field overwrites
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigPatch {
    pub work_mins: Option<u64>,
    pub break_mins: Option<u64>,
    pub work_color: Option<String>,
    pub break_color: Option<String>,
    pub transparency: Option<f32>,
    pub allow_move: Option<bool>,
    pub font_size: Option<u32>,
}

impl ConfigPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply every present field onto `config`
    pub fn apply_to(self, config: &mut Config) {
        if let Some(v) = self.work_mins {
            config.work_mins = v;
        }
        if let Some(v) = self.break_mins {
            config.break_mins = v;
        }
        if let Some(v) = self.work_color {
            config.work_color = v;
        }
        if let Some(v) = self.break_color {
            config.break_color = v;
        }
        if let Some(v) = self.transparency {
            config.transparency = v;
        }
        if let Some(v) = self.allow_move {
            config.allow_move = v;
        }
        if let Some(v) = self.font_size {
            config.font_size = v;
        }
    }
}

impl From<Config> for ConfigPatch {
    fn from(config: Config) -> Self {
        Self {
            work_mins: Some(config.work_mins),
            break_mins: Some(config.break_mins),
            work_color: Some(config.work_color),
            break_color: Some(config.break_color),
            transparency: Some(config.transparency),
            allow_move: Some(config.allow_move),
            font_size: Some(config.font_size),
        }
    }
}

/// Owner of the live configuration and where it is persisted
#[derive(Debug, Clone)]
pub struct ConfigStore {
    config: Config,
    path: Option<PathBuf>,
}

impl ConfigStore {
    /// Store backed by `path`, loaded with the never-fail policy
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let config = Config::load_from_path(&path);
        Self {
            config,
            path: Some(path),
        }
    }

    /// Store that lives only in memory; `persist` is a no-op
    pub fn in_memory(config: Config) -> Self {
        Self { config, path: None }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Shallow merge: present fields overwrite stored values
    pub fn merge(&mut self, patch: ConfigPatch) {
        patch.apply_to(&mut self.config);
    }

    /// Overwrite every stored value with `snapshot`
    pub fn replace(&mut self, snapshot: Config) {
        self.merge(snapshot.into());
    }

    /// Write the current values to the backing file, if any
    pub fn persist(&self) -> Result<()> {
        match &self.path {
            Some(path) => self.config.save_to_path(path),
            None => {
                log::debug!("In-memory config store, nothing to persist");
                Ok(())
            }
        }
    }
}
