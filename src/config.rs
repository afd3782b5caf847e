//! Settings validation and environment overrides
//!
//! The settings editor hands raw user input to [`SettingsInput::validate`],
//! which either produces a complete [`Config`] or a [`ValidationError`]
//! for the editor to show. Nothing unvalidated ever reaches the timer.
//!
//! Environment variables (all optional) override values from the config file:
//! - POMODORO_WORK_MINS: work phase length in minutes
//! - POMODORO_BREAK_MINS: break phase length in minutes
//! - POMODORO_FONT_SIZE: countdown font size
//! - POMODORO_TRANSPARENCY: overlay opacity (0.0-1.0)

use crate::config_file::{Config, ConfigPatch};
use crate::constants::{FONT_SIZE_MAX, FONT_SIZE_MIN, PHASE_MINS_MAX, PHASE_MINS_MIN};
use crate::error::ValidationError;
use log::{debug, info, warn};
use std::env;

/// Raw, unvalidated field values as typed into the settings editor
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsInput {
    pub work_mins: String,
    pub break_mins: String,
    pub work_color: String,
    pub break_color: String,
    pub transparency: String,
    pub allow_move: String,
    pub font_size: String,
}

impl SettingsInput {
    /// Prefill the editor fields from the current configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            work_mins: config.work_mins.to_string(),
            break_mins: config.break_mins.to_string(),
            work_color: config.work_color.clone(),
            break_color: config.break_color.clone(),
            transparency: config.transparency.to_string(),
            allow_move: config.allow_move.to_string(),
            font_size: config.font_size.to_string(),
        }
    }

    /// Replace one field by its config key name
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ValidationError> {
        let slot = match key {
            "work_mins" => &mut self.work_mins,
            "break_mins" => &mut self.break_mins,
            "work_color" => &mut self.work_color,
            "break_color" => &mut self.break_color,
            "transparency" => &mut self.transparency,
            "allow_move" => &mut self.allow_move,
            "font_size" => &mut self.font_size,
            other => return Err(ValidationError::UnknownField(other.to_string())),
        };
        *slot = value.trim().to_string();
        Ok(())
    }

    /// Check every field and build the snapshot delivered to the timer
    pub fn validate(&self) -> Result<Config, ValidationError> {
        Ok(Config {
            work_mins: parse_minutes("work_mins", &self.work_mins)?,
            break_mins: parse_minutes("break_mins", &self.break_mins)?,
            work_color: parse_color("work_color", &self.work_color)?,
            break_color: parse_color("break_color", &self.break_color)?,
            transparency: parse_transparency(&self.transparency)?,
            allow_move: parse_bool("allow_move", &self.allow_move)?,
            font_size: parse_font_size(&self.font_size)?,
        })
    }
}

fn parse_minutes(field: &'static str, raw: &str) -> Result<u64, ValidationError> {
    let value = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| ValidationError::NotAnInteger {
            field,
            value: raw.to_string(),
        })?;
    if !(PHASE_MINS_MIN..=PHASE_MINS_MAX).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field,
            value: value.to_string(),
            min: PHASE_MINS_MIN.to_string(),
            max: PHASE_MINS_MAX.to_string(),
        });
    }
    Ok(value)
}

fn parse_color(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(value.to_string())
}

fn parse_transparency(raw: &str) -> Result<f32, ValidationError> {
    let field = "transparency";
    let value = raw
        .trim()
        .parse::<f32>()
        .map_err(|_| ValidationError::NotANumber {
            field,
            value: raw.to_string(),
        })?;
    // NaN fails the range check too
    if !(0.0..=1.0).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field,
            value: value.to_string(),
            min: "0.0".to_string(),
            max: "1.0".to_string(),
        });
    }
    Ok(value)
}

fn parse_font_size(raw: &str) -> Result<u32, ValidationError> {
    let field = "font_size";
    let value = raw
        .trim()
        .parse::<u32>()
        .map_err(|_| ValidationError::NotAnInteger {
            field,
            value: raw.to_string(),
        })?;
    if !(FONT_SIZE_MIN..=FONT_SIZE_MAX).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field,
            value: value.to_string(),
            min: FONT_SIZE_MIN.to_string(),
            max: FONT_SIZE_MAX.to_string(),
        });
    }
    Ok(value)
}

fn parse_bool(field: &'static str, raw: &str) -> Result<bool, ValidationError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ValidationError::NotABoolean {
            field,
            value: raw.to_string(),
        }),
    }
}

impl Config {
    /// Replace every value the settings editor would reject with its default
    ///
    /// Used for values that bypassed the editor, such as a hand-edited file.
    pub fn sanitized(self) -> Self {
        let defaults = Config::default();
        Config {
            work_mins: keep_valid(
                "work_mins",
                self.work_mins,
                (PHASE_MINS_MIN..=PHASE_MINS_MAX).contains(&self.work_mins),
                defaults.work_mins,
            ),
            break_mins: keep_valid(
                "break_mins",
                self.break_mins,
                (PHASE_MINS_MIN..=PHASE_MINS_MAX).contains(&self.break_mins),
                defaults.break_mins,
            ),
            work_color: keep_valid(
                "work_color",
                self.work_color.trim().to_string(),
                !self.work_color.trim().is_empty(),
                defaults.work_color,
            ),
            break_color: keep_valid(
                "break_color",
                self.break_color.trim().to_string(),
                !self.break_color.trim().is_empty(),
                defaults.break_color,
            ),
            transparency: keep_valid(
                "transparency",
                self.transparency,
                (0.0..=1.0).contains(&self.transparency),
                defaults.transparency,
            ),
            allow_move: self.allow_move,
            font_size: keep_valid(
                "font_size",
                self.font_size,
                (FONT_SIZE_MIN..=FONT_SIZE_MAX).contains(&self.font_size),
                defaults.font_size,
            ),
        }
    }
}

fn keep_valid<T: std::fmt::Debug>(field: &str, value: T, valid: bool, default: T) -> T {
    if valid {
        return value;
    }
    warn!(
        "Invalid {} in config file: {:?}. Using default {:?}.",
        field, value, default
    );
    default
}

/// Read one override variable through the editor's validation rules
fn parse_env<T>(
    name: &str,
    parse: impl FnOnce(&str) -> Result<T, ValidationError>,
) -> Option<T>
where
    T: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => match parse(&val) {
            Ok(value) => {
                info!("{} override set via environment variable: {}", name, value);
                Some(value)
            }
            Err(e) => {
                warn!("Invalid {}: {}. Using config file value.", name, e);
                None
            }
        },
        Err(_) => {
            debug!("{} not set.", name);
            None
        }
    }
}

/// Collect the POMODORO_* environment overrides
pub fn env_overrides() -> ConfigPatch {
    ConfigPatch {
        work_mins: parse_env("POMODORO_WORK_MINS", |v| parse_minutes("work_mins", v)),
        break_mins: parse_env("POMODORO_BREAK_MINS", |v| parse_minutes("break_mins", v)),
        font_size: parse_env("POMODORO_FONT_SIZE", parse_font_size),
        transparency: parse_env("POMODORO_TRANSPARENCY", parse_transparency),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> SettingsInput {
        SettingsInput::from_config(&Config::default())
    }

    #[test]
    fn test_prefilled_input_validates_to_same_config() {
        assert_eq!(input().validate(), Ok(Config::default()));
    }

    #[test]
    fn test_minutes_must_be_positive_integers() {
        let mut raw = input();
        raw.work_mins = "0".to_string();
        assert!(matches!(
            raw.validate(),
            Err(ValidationError::OutOfRange { field: "work_mins", .. })
        ));

        raw.work_mins = "12.5".to_string();
        assert!(matches!(
            raw.validate(),
            Err(ValidationError::NotAnInteger { field: "work_mins", .. })
        ));

        raw.work_mins = "-5".to_string();
        assert!(raw.validate().is_err(), "Negative minutes should be rejected");

        raw.work_mins = " 30 ".to_string();
        assert_eq!(raw.validate().map(|c| c.work_mins), Ok(30));
    }

    #[test]
    fn test_transparency_boundaries() {
        let mut raw = input();
        for ok in ["0", "0.0", "0.55", "1", "1.0"] {
            raw.transparency = ok.to_string();
            assert!(raw.validate().is_ok(), "Should accept {}", ok);
        }
        for bad in ["-0.01", "1.01", "NaN", "half"] {
            raw.transparency = bad.to_string();
            assert!(raw.validate().is_err(), "Should reject {}", bad);
        }
    }

    #[test]
    fn test_font_size_boundaries() {
        let mut raw = input();
        raw.font_size = "9".to_string();
        assert!(raw.validate().is_err(), "Should reject 9");
        raw.font_size = "10".to_string();
        assert_eq!(raw.validate().map(|c| c.font_size), Ok(10));
        raw.font_size = "500".to_string();
        assert_eq!(raw.validate().map(|c| c.font_size), Ok(500));
        raw.font_size = "501".to_string();
        assert!(raw.validate().is_err(), "Should reject 501");
    }

    #[test]
    fn test_colors_must_not_be_empty() {
        let mut raw = input();
        raw.break_color = "   ".to_string();
        assert_eq!(
            raw.validate(),
            Err(ValidationError::Empty {
                field: "break_color"
            })
        );
    }

    #[test]
    fn test_set_by_key() {
        let mut raw = input();
        raw.set("allow_move", "yes").unwrap();
        raw.set("work_color", "#ABCDEF").unwrap();
        let config = raw.validate().unwrap();
        assert!(config.allow_move);
        assert_eq!(config.work_color, "#ABCDEF");

        assert_eq!(
            raw.set("volume", "3"),
            Err(ValidationError::UnknownField("volume".to_string()))
        );
    }

    #[test]
    fn test_env_overrides() {
        env::set_var("POMODORO_WORK_MINS", "50");
        env::set_var("POMODORO_BREAK_MINS", "0");
        env::set_var("POMODORO_FONT_SIZE", "abc");
        env::set_var("POMODORO_TRANSPARENCY", "0.3");

        let patch = env_overrides();
        assert_eq!(patch.work_mins, Some(50));
        assert_eq!(patch.break_mins, None, "0 minutes is out of range");
        assert_eq!(patch.font_size, None, "Non-numeric value is ignored");
        assert_eq!(patch.transparency, Some(0.3));

        env::remove_var("POMODORO_WORK_MINS");
        env::remove_var("POMODORO_BREAK_MINS");
        env::remove_var("POMODORO_FONT_SIZE");
        env::remove_var("POMODORO_TRANSPARENCY");

        assert!(env_overrides().is_empty());
    }

    #[test]
    fn test_sanitized_keeps_valid_config() {
        let config = Config {
            work_mins: 1440,
            break_mins: 1,
            transparency: 1.0,
            font_size: 10,
            ..Default::default()
        };
        assert_eq!(config.clone().sanitized(), config);
    }

    #[test]
    fn test_sanitized_replaces_each_bad_field() {
        let config = Config {
            work_mins: 0,
            break_mins: u64::MAX,
            work_color: "  ".into(),
            break_color: "navy".into(),
            transparency: 4.0,
            allow_move: true,
            font_size: 7,
        }
        .sanitized();

        assert_eq!(config.work_mins, 25);
        assert_eq!(config.break_mins, 5);
        assert_eq!(config.work_color, "white");
        assert_eq!(config.break_color, "navy");
        assert!((config.transparency - 0.1).abs() < f32::EPSILON);
        assert!(config.allow_move);
        assert_eq!(config.font_size, 100);
    }

    #[test]
    fn test_sanitized_rejects_nan_transparency() {
        let config = Config {
            transparency: f32::NAN,
            ..Default::default()
        }
        .sanitized();
        assert!((config.transparency - 0.1).abs() < f32::EPSILON);
    }
}
