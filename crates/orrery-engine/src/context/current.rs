use std::sync::Arc;

use parking_lot::RwLock;

use super::{RenderContext, RenderContextType};
use crate::error::{ControlError, Result};

/// Shared view of the render context currently published by one render control.
///
/// Cloning yields another handle onto the same slot. Only the owning render
/// control writes it (on the render thread, at context acquisition and loss);
/// any thread may query it.
#[derive(Debug, Clone, Default)]
pub struct ContextHandle {
    current: Arc<RwLock<Option<RenderContext>>>,
}

impl ContextHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes the level matching `(api, major, minor)`.
    ///
    /// Unsupported combinations clear the slot and return `false`.
    pub(crate) fn set_current(&self, api: RenderContextType, major: u32, minor: u32) -> bool {
        let resolved = RenderContext::resolve(api, major, minor);
        *self.current.write() = resolved;
        match resolved {
            Some(ctx) => {
                log::info!("current render context set to {ctx}");
                true
            }
            None => false,
        }
    }

    pub(crate) fn unset_current(&self) {
        log::info!("current render context unset");
        *self.current.write() = None;
    }

    /// Returns `true` if a context is published. Never fails.
    pub fn is_current(&self) -> bool {
        self.current.read().is_some()
    }

    pub fn current(&self) -> Result<RenderContext> {
        (*self.current.read()).ok_or(ControlError::NoRenderContext)
    }

    pub fn is_currently_gles2(&self) -> Result<bool> {
        Ok(self.current()? == RenderContext::OPENGL_ES_2)
    }

    pub fn is_currently_gles3(&self) -> Result<bool> {
        let ctx = self.current()?;
        Ok(ctx.api() == RenderContextType::OpenGlEs && ctx.major_version() == 3)
    }

    pub fn is_currently_gles3_0(&self) -> Result<bool> {
        Ok(self.current()? == RenderContext::OPENGL_ES_3_0)
    }

    pub fn is_currently_gles3_1(&self) -> Result<bool> {
        Ok(self.current()? == RenderContext::OPENGL_ES_3_1)
    }

    pub fn is_currently_gles3_2(&self) -> Result<bool> {
        Ok(self.current()? == RenderContext::OPENGL_ES_3_2)
    }

    /// `true` iff `candidate` has the current API family and a version not
    /// above the current one.
    pub fn is_compatible_with_current(&self, candidate: &RenderContext) -> Result<bool> {
        let current = self.current()?;
        Ok(candidate.api() == current.api()
            && (candidate.major_version(), candidate.minor_version())
                <= (current.major_version(), current.minor_version()))
    }

    /// Highest supported level of the current API family.
    pub fn maximum_version(&self) -> Result<RenderContext> {
        match self.current()?.api() {
            RenderContextType::OpenGlEs => Ok(RenderContext::OPENGL_ES_3_2),
            other => Err(ControlError::UnsupportedContextType(other)),
        }
    }

    /// Lowest supported level of the current API family.
    pub fn minimum_version(&self) -> Result<RenderContext> {
        match self.current()?.api() {
            RenderContextType::OpenGlEs => Ok(RenderContext::OPENGL_ES_2),
            other => Err(ControlError::UnsupportedContextType(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ES: RenderContextType = RenderContextType::OpenGlEs;

    #[test]
    fn queries_fail_without_context() {
        let handle = ContextHandle::new();
        assert!(!handle.is_current());
        assert_eq!(handle.current(), Err(ControlError::NoRenderContext));
        assert_eq!(handle.is_currently_gles2(), Err(ControlError::NoRenderContext));
        assert_eq!(handle.is_currently_gles3(), Err(ControlError::NoRenderContext));
        assert_eq!(
            handle.is_compatible_with_current(&RenderContext::OPENGL_ES_2),
            Err(ControlError::NoRenderContext)
        );
        assert_eq!(handle.maximum_version(), Err(ControlError::NoRenderContext));
    }

    #[test]
    fn set_and_query_level() {
        let handle = ContextHandle::new();
        assert!(handle.set_current(ES, 3, 1));
        assert_eq!(handle.current(), Ok(RenderContext::OPENGL_ES_3_1));
        assert_eq!(handle.is_currently_gles3(), Ok(true));
        assert_eq!(handle.is_currently_gles3_1(), Ok(true));
        assert_eq!(handle.is_currently_gles3_0(), Ok(false));
        assert_eq!(handle.is_currently_gles2(), Ok(false));
        assert_eq!(handle.minimum_version(), Ok(RenderContext::OPENGL_ES_2));
        assert_eq!(handle.maximum_version(), Ok(RenderContext::OPENGL_ES_3_2));
    }

    #[test]
    fn compatibility_is_version_ceiling() {
        let handle = ContextHandle::new();
        handle.set_current(ES, 3, 0);
        assert_eq!(handle.is_compatible_with_current(&RenderContext::OPENGL_ES_2), Ok(true));
        assert_eq!(handle.is_compatible_with_current(&RenderContext::OPENGL_ES_3_0), Ok(true));
        assert_eq!(handle.is_compatible_with_current(&RenderContext::OPENGL_ES_3_1), Ok(false));
    }

    #[test]
    fn unsupported_set_clears_previous() {
        let handle = ContextHandle::new();
        assert!(handle.set_current(ES, 3, 2));
        assert!(!handle.set_current(RenderContextType::Vulkan, 1, 1));
        assert!(!handle.is_current());
    }

    #[test]
    fn clones_share_the_slot() {
        let a = ContextHandle::new();
        let b = a.clone();
        a.set_current(ES, 2, 0);
        assert_eq!(b.current(), Ok(RenderContext::OPENGL_ES_2));
        a.unset_current();
        assert!(!b.is_current());
    }
}
