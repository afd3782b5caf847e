//! Rendering boundary
//!
//! The core decides what text, color and opacity to show; a [`Surface`]
//! puts it on screen. The tray app paints into the tray title, tooltip and
//! icon, the terminal app prints lines.

use crate::config_file::Config;
use crate::cycle::Phase;
use crate::error::ResourceError;

pub trait Surface {
    /// Countdown text, already formatted as `MM:SS`
    fn show_time(&mut self, text: &str);

    fn set_text_color(&mut self, color: &str);

    /// Overlay window opacity, 0.0-1.0
    fn set_transparency(&mut self, alpha: f32);

    fn set_font_size(&mut self, font_size: u32);

    /// Whether dragging the overlay moves it
    fn set_allow_move(&mut self, allowed: bool);

    fn set_visible(&mut self, visible: bool);

    /// Create the full-screen flash overlay at opacity 0
    fn begin_flash(&mut self, color: &str);

    fn set_flash_opacity(&mut self, opacity: f32);

    /// Destroy the flash overlay
    fn end_flash(&mut self);

    /// Bring up the settings editor prefilled with `config`
    fn open_settings(&mut self, config: &Config);

    fn phase_changed(&mut self, _phase: Phase) {}

    fn running_changed(&mut self, _running: bool) {}

    /// Release windows, icons and other OS resources during exit
    fn release(&mut self) -> Result<(), ResourceError> {
        Ok(())
    }
}

/// Format seconds as `MM:SS`; minutes grow past two digits when needed
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(1500), "25:00");
        assert_eq!(format_clock(299), "04:59");
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(6000), "100:00");
    }
}
