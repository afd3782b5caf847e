//! Error taxonomy for Pomodoro Overlay
//!
//! Core timer operations never fail. Everything fallible lives at the
//! boundary: the settings editor, the config file, and background
//! presences torn down during exit.

use std::path::PathBuf;
use thiserror::Error;

/// Raw settings input rejected by the editor before it reaches the core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be a whole number, got '{value}'")]
    NotAnInteger { field: &'static str, value: String },

    #[error("{field} must be a number, got '{value}'")]
    NotANumber { field: &'static str, value: String },

    #[error("{field} must be true or false, got '{value}'")]
    NotABoolean { field: &'static str, value: String },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: String,
        min: String,
        max: String,
    },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("unknown setting '{0}'")]
    UnknownField(String),
}

/// Persisted configuration could not be read. Callers fall back to defaults.
#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// A background presence failed to stop or release its resources.
#[derive(Error, Debug)]
#[error("failed to stop {presence}: {message}")]
pub struct ResourceError {
    pub presence: String,
    pub message: String,
}

impl ResourceError {
    pub fn new(presence: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self {
            presence: presence.into(),
            message: message.to_string(),
        }
    }
}
