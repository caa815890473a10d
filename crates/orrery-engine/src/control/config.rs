use std::time::Duration;

use crate::surface::Color;

/// Frame rate value selecting one frame per display refresh.
pub const USE_DISPLAY_REFRESH_RATE: f64 = f64::NAN;

/// Frame rate value selecting back-to-back frames.
pub const USE_CONTINUOUS_RENDERING: f64 = 0.0;

/// Frames per FPS measurement window in continuous mode.
pub(crate) const CONTINUOUS_FPS_WINDOW: u32 = 50;

/// Accepts NaN, zero and positive finite rates.
pub fn is_valid_frame_rate(rate: f64) -> bool {
    rate.is_nan() || rate == USE_CONTINUOUS_RENDERING || (rate.is_finite() && rate > 0.0)
}

/// Settings a [`RenderControl`](super::RenderControl) is created with.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderControlConfig {
    /// Target frame rate: [`USE_DISPLAY_REFRESH_RATE`], [`USE_CONTINUOUS_RENDERING`]
    /// or frames per second.
    pub frame_rate: f64,

    /// Paint the background before scene views when the surface is opaque.
    pub surface_prep_enabled: bool,

    pub background_color: Color,

    /// Upper bound on the frame delta handed to callbacks and animations.
    pub max_frame_delta: Option<Duration>,
}

impl Default for RenderControlConfig {
    fn default() -> Self {
        Self {
            frame_rate: USE_DISPLAY_REFRESH_RATE,
            surface_prep_enabled: true,
            background_color: Color::BLACK,
            max_frame_delta: None,
        }
    }
}

impl RenderControlConfig {
    pub fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn with_surface_prep(mut self, enabled: bool) -> Self {
        self.surface_prep_enabled = enabled;
        self
    }

    pub fn with_background_color(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_max_frame_delta(mut self, max: Duration) -> Self {
        self.max_frame_delta = Some(max);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_rate_encoding() {
        assert!(is_valid_frame_rate(USE_DISPLAY_REFRESH_RATE));
        assert!(is_valid_frame_rate(USE_CONTINUOUS_RENDERING));
        assert!(is_valid_frame_rate(24.0));
        assert!(!is_valid_frame_rate(-1.0));
        assert!(!is_valid_frame_rate(f64::INFINITY));
    }

    #[test]
    fn defaults() {
        let config = RenderControlConfig::default();
        assert!(config.frame_rate.is_nan());
        assert!(config.surface_prep_enabled);
        assert_eq!(config.background_color, Color::BLACK);
        assert_eq!(config.max_frame_delta, None);
    }
}
