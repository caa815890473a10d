use core::cmp::Ordering;
use core::fmt;

use crate::error::{ControlError, Result};

/// Basic graphics API family of a render context.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RenderContextType {
    None,
    OpenGlEs,
    Vulkan,
}

/// A supported GPU context level: API family plus major/minor version.
///
/// Only the levels exposed as associated constants exist; arbitrary
/// combinations reported by a platform are mapped onto them by [`resolve`].
///
/// [`resolve`]: RenderContext::resolve
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RenderContext {
    api: RenderContextType,
    major: u32,
    minor: u32,
}

impl RenderContext {
    pub const OPENGL_ES_2: Self = Self::level(RenderContextType::OpenGlEs, 2, 0);
    pub const OPENGL_ES_3_0: Self = Self::level(RenderContextType::OpenGlEs, 3, 0);
    pub const OPENGL_ES_3_1: Self = Self::level(RenderContextType::OpenGlEs, 3, 1);
    pub const OPENGL_ES_3_2: Self = Self::level(RenderContextType::OpenGlEs, 3, 2);

    /// All supported levels, lowest first.
    pub const SUPPORTED: [Self; 4] = [
        Self::OPENGL_ES_2,
        Self::OPENGL_ES_3_0,
        Self::OPENGL_ES_3_1,
        Self::OPENGL_ES_3_2,
    ];

    const fn level(api: RenderContextType, major: u32, minor: u32) -> Self {
        Self { api, major, minor }
    }

    /// Maps a platform-reported context onto a supported level.
    ///
    /// Versions newer than ES 3.2 (higher 3.x minor, or major > 3) are assumed
    /// backward compatible and clamp to ES 3.2. Returns `None` for Vulkan, for
    /// `None`, and for ES majors below 2.
    pub fn resolve(api: RenderContextType, major: u32, minor: u32) -> Option<Self> {
        match api {
            RenderContextType::None => None,
            RenderContextType::Vulkan => {
                log::error!("Vulkan render contexts are not supported");
                None
            }
            RenderContextType::OpenGlEs => match (major, minor) {
                (2, _) => Some(Self::OPENGL_ES_2),
                (3, 0) => Some(Self::OPENGL_ES_3_0),
                (3, 1) => Some(Self::OPENGL_ES_3_1),
                (3, 2) => Some(Self::OPENGL_ES_3_2),
                (3, _) => {
                    log::warn!("ES 3 minor version is {minor}, assuming compatibility with ES 3.2");
                    Some(Self::OPENGL_ES_3_2)
                }
                (m, _) if m > 3 => {
                    log::warn!("ES major version is {m}, assuming compatibility with ES 3.2");
                    Some(Self::OPENGL_ES_3_2)
                }
                (m, _) => {
                    log::error!("ES major version {m} is unsupported");
                    None
                }
            },
        }
    }

    #[inline]
    pub fn api(&self) -> RenderContextType {
        self.api
    }

    #[inline]
    pub fn major_version(&self) -> u32 {
        self.major
    }

    #[inline]
    pub fn minor_version(&self) -> u32 {
        self.minor
    }

    /// Orders two contexts by `(major, minor)`.
    ///
    /// Contexts of different API families are incomparable.
    pub fn compare_version(&self, other: &RenderContext) -> Result<Ordering> {
        if self.api != other.api {
            return Err(ControlError::ContextTypeConflict(self.api, other.api));
        }
        Ok((self.major, self.minor).cmp(&(other.major, other.minor)))
    }

    pub fn is_lower_version_than(&self, other: &RenderContext) -> Result<bool> {
        Ok(self.compare_version(other)? == Ordering::Less)
    }

    pub fn is_higher_version_than(&self, other: &RenderContext) -> Result<bool> {
        Ok(self.compare_version(other)? == Ordering::Greater)
    }
}

impl fmt::Display for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.api {
            RenderContextType::OpenGlEs => write!(f, "OpenGL ES {}.{}", self.major, self.minor),
            RenderContextType::Vulkan => write!(f, "Vulkan {}.{}", self.major, self.minor),
            RenderContextType::None => f.write_str("no render context"),
        }
    }
}
