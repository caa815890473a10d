/// Straight-alpha RGBA color with `f32` channels in `[0, 1]`.
///
/// Used for the surface background clear; the platform converts it to
/// whatever its clear call expects.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    #[inline]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from bytes (`0`–`255`).
    #[inline]
    pub fn from_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a as f32 / 255.0)
    }

    /// Creates a color from a packed `0xAARRGGBB` integer.
    #[inline]
    pub fn from_argb(argb: u32) -> Self {
        let [a, r, g, b] = argb.to_be_bytes();
        Self::from_u8(r, g, b, a)
    }

    /// Packs the color back into `0xAARRGGBB`, rounding each channel.
    pub fn to_argb(self) -> u32 {
        let c = self.clamped();
        let byte = |v: f32| (v * 255.0).round() as u8;
        u32::from_be_bytes([byte(c.a), byte(c.r), byte(c.g), byte(c.b)])
    }

    #[inline]
    pub fn clamped(self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
            a: self.a.clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argb_unpacks_channels() {
        let c = Color::from_argb(0xFF_FF_00_00);
        assert_eq!(c, Color::rgba(1.0, 0.0, 0.0, 1.0));
        assert_eq!(Color::from_argb(0x00_00_00_00), Color::TRANSPARENT);
    }

    #[test]
    fn argb_survives_repacking() {
        assert_eq!(Color::from_argb(0x80_12_34_56).to_argb(), 0x80_12_34_56);
    }

    #[test]
    fn repacking_clamps_out_of_range_channels() {
        assert_eq!(Color::rgba(2.0, -1.0, 0.5, 1.0).to_argb(), 0xFF_FF_00_80);
    }
}
