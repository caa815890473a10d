use std::fmt;

/// Surface dimensions in physical pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn aspect_ratio(self) -> f32 {
        if self.height == 0 {
            0.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

impl From<(u32, u32)> for SurfaceSize {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for SurfaceSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_when_any_side_is_zero() {
        assert!(SurfaceSize::new(0, 10).is_empty());
        assert!(SurfaceSize::new(10, 0).is_empty());
        assert!(!SurfaceSize::new(1, 1).is_empty());
    }

    #[test]
    fn aspect_ratio_guards_zero_height() {
        assert_eq!(SurfaceSize::new(800, 400).aspect_ratio(), 2.0);
        assert_eq!(SurfaceSize::new(800, 0).aspect_ratio(), 0.0);
    }

    #[test]
    fn displays_as_w_by_h() {
        assert_eq!(SurfaceSize::from((1024, 768)).to_string(), "1024x768");
    }
}
