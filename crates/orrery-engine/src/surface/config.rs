use crate::control::{RenderControlConfig, USE_DISPLAY_REFRESH_RATE};
use crate::error::{ControlError, Result};

/// Anti-aliasing strategy requested from the platform surface.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum AntiAliasing {
    #[default]
    None,
    MultiSampling,
    /// NVIDIA Tegra coverage sampling.
    CoverageSampling,
}

/// Per-channel bit depths of the surface's color buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ColorBits {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl ColorBits {
    pub const RGB565: Self = Self { red: 5, green: 6, blue: 5, alpha: 0 };
    pub const RGBA8888: Self = Self { red: 8, green: 8, blue: 8, alpha: 8 };
}

impl Default for ColorBits {
    fn default() -> Self {
        Self::RGB565
    }
}

/// What a platform surface is asked to provide when it is created.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceConfig {
    /// Initial frame rate, using the [`RenderControl`](crate::control::RenderControl) encoding.
    pub frame_rate: f64,
    pub anti_aliasing: AntiAliasing,
    /// Sample count for [`AntiAliasing::MultiSampling`]; ignored otherwise.
    pub multisample_count: u32,
    pub transparent: bool,
    pub color_bits: ColorBits,
    pub depth_bits: u8,
    /// Refresh rate of the display the surface is shown on, in Hz.
    pub display_refresh_rate: f64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            frame_rate: USE_DISPLAY_REFRESH_RATE,
            anti_aliasing: AntiAliasing::None,
            multisample_count: 0,
            transparent: false,
            color_bits: ColorBits::default(),
            depth_bits: 16,
            display_refresh_rate: 60.0,
        }
    }
}

impl SurfaceConfig {
    pub fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn with_multisampling(mut self, samples: u32) -> Self {
        self.anti_aliasing = AntiAliasing::MultiSampling;
        self.multisample_count = samples;
        self
    }

    pub fn with_coverage_sampling(mut self) -> Self {
        self.anti_aliasing = AntiAliasing::CoverageSampling;
        self
    }

    pub fn with_transparent(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    pub fn with_color_bits(mut self, color_bits: ColorBits) -> Self {
        self.color_bits = color_bits;
        self
    }

    pub fn with_depth_bits(mut self, depth_bits: u8) -> Self {
        self.depth_bits = depth_bits;
        self
    }

    pub fn with_display_refresh_rate(mut self, hz: f64) -> Self {
        self.display_refresh_rate = hz;
        self
    }

    /// Checks the values a platform could not honor.
    pub fn validate(&self) -> Result<()> {
        if !crate::control::is_valid_frame_rate(self.frame_rate) {
            return Err(ControlError::InvalidFrameRate(self.frame_rate));
        }
        if self.anti_aliasing == AntiAliasing::MultiSampling && self.multisample_count < 2 {
            return Err(ControlError::InvalidSurfaceConfig("multisampling needs at least 2 samples"));
        }
        let ColorBits { red, green, blue, alpha } = self.color_bits;
        if [red, green, blue, alpha].iter().any(|&b| b > 8) {
            return Err(ControlError::InvalidSurfaceConfig("color channels are limited to 8 bits"));
        }
        if !(self.display_refresh_rate.is_finite() && self.display_refresh_rate > 0.0) {
            return Err(ControlError::InvalidSurfaceConfig("display refresh rate must be positive"));
        }
        Ok(())
    }

    /// Render-control settings implied by this surface.
    pub fn render_control_config(&self) -> RenderControlConfig {
        RenderControlConfig::default().with_frame_rate(self.frame_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SurfaceConfig::default();
        assert!(config.frame_rate.is_nan());
        assert_eq!(config.color_bits, ColorBits::RGB565);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn multisampling_requires_two_samples() {
        assert!(SurfaceConfig::default().with_multisampling(1).validate().is_err());
        assert!(SurfaceConfig::default().with_multisampling(4).validate().is_ok());
        // coverage sampling ignores the count
        assert!(SurfaceConfig::default().with_coverage_sampling().validate().is_ok());
    }

    #[test]
    fn rejects_bad_rates() {
        assert_eq!(
            SurfaceConfig::default().with_frame_rate(-5.0).validate(),
            Err(ControlError::InvalidFrameRate(-5.0))
        );
        assert!(SurfaceConfig::default().with_display_refresh_rate(0.0).validate().is_err());
    }

    #[test]
    fn rejects_wide_channels() {
        let bits = ColorBits { red: 10, ..ColorBits::RGBA8888 };
        assert!(SurfaceConfig::default().with_color_bits(bits).validate().is_err());
    }

    #[test]
    fn carries_frame_rate_into_control_config() {
        let config = SurfaceConfig::default().with_frame_rate(30.0);
        assert_eq!(config.render_control_config().frame_rate, 30.0);
    }
}
