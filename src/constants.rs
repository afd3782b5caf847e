//! Centralized constants for Pomodoro Overlay
//!
//! This module contains all configurable numerical values used throughout
//! the application. Each constant includes documentation on its purpose,
//! unit, and recommended value range.

// ============================================================================
// CYCLE DURATIONS
// ============================================================================

/// Default length of a work phase when no config exists.
/// Unit: minutes
/// Recommended range: 15-50
pub const WORK_MINS_DEFAULT: u64 = 25;

/// Default length of a break phase when no config exists.
/// Unit: minutes
/// Recommended range: 3-15
pub const BREAK_MINS_DEFAULT: u64 = 5;

/// Smallest phase length accepted by the settings editor.
/// Unit: minutes
/// Range: Fixed minimum, a zero-length phase would switch forever
pub const PHASE_MINS_MIN: u64 = 1;

/// Largest phase length accepted by the settings editor.
/// Unit: minutes
/// Range: Fixed maximum (one day), keeps `mins * 60` far from overflow
pub const PHASE_MINS_MAX: u64 = 1440;

/// Length of one countdown tick.
/// Unit: milliseconds
/// Range: Fixed, the display counts whole seconds
pub const TICK_INTERVAL_MS: u64 = 1000;

// ============================================================================
// APPEARANCE
// ============================================================================

/// Default label color during a work phase.
pub const WORK_COLOR_DEFAULT: &str = "white";

/// Default label and flash color during a break phase.
pub const BREAK_COLOR_DEFAULT: &str = "#FF6347";

/// Default overlay window opacity.
/// Unit: fraction (0.0 = invisible, 1.0 = opaque)
/// Range: 0.0-1.0
pub const TRANSPARENCY_DEFAULT: f32 = 0.1;

/// Default countdown font size.
/// Unit: points
pub const FONT_SIZE_DEFAULT: u32 = 100;

/// Smallest font size accepted by the settings editor.
/// Unit: points
pub const FONT_SIZE_MIN: u32 = 10;

/// Largest font size accepted by the settings editor.
/// Unit: points
pub const FONT_SIZE_MAX: u32 = 500;

// ============================================================================
// PHASE TRANSITION FLASH
// ============================================================================

/// Total wall-clock length of the fade-in plus fade-out pulse.
/// Unit: milliseconds
/// Recommended range: 1000-4000
pub const FLASH_DURATION_MS: u64 = 2000;

/// Number of opacity increments in each half of the pulse.
/// Unit: steps
/// Recommended range: 20-120 (higher = smoother, more wake-ups)
pub const FLASH_STEPS: u32 = 80;

/// Peak opacity reached by the flash overlay.
/// Unit: fraction
/// Range: 0.0-1.0
pub const FLASH_PEAK_OPACITY: f32 = 0.6;

// ============================================================================
// COMMAND QUEUE & POLLING
// ============================================================================

/// Capacity of the bounded intent queue feeding the event thread.
/// Unit: commands
/// Recommended range: 16-256 (presences drop intents when it is full)
pub const COMMAND_QUEUE_CAPACITY: usize = 64;

/// Longest the headless runtime sleeps when nothing is scheduled.
/// Unit: milliseconds
/// Recommended range: 100-1000
pub const IDLE_POLL_INTERVAL_MS: u64 = 500;

/// Hotkey listener wake-up interval used to notice shutdown.
/// Unit: milliseconds
/// Recommended range: 100-1000
pub const HOTKEY_POLL_INTERVAL_MS: u64 = 250;

// ============================================================================
// NOTIFICATION TIMEOUTS
// ============================================================================

/// Phase switch notification display duration.
/// Unit: milliseconds
/// Recommended range: 2000-5000
pub const NOTIFICATION_TIMEOUT_MS: u32 = 3000;
