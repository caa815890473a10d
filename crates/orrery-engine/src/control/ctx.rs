use super::RenderControl;
use crate::context::{ContextHandle, RenderContext};
use crate::error::Result;
use crate::surface::SurfaceSize;
use crate::time::FrameTime;

/// Per-frame context passed to [`SceneView::render_frame`](crate::scene::SceneView::render_frame).
///
/// Lifetimes:
/// - `'a` is the duration of one `render_frame` call
pub struct FrameCtx<'a> {
    pub time: FrameTime,
    pub surface_size: SurfaceSize,
    /// Index of the view being painted; 0 is back-most.
    pub depth_order: usize,
    pub context: &'a ContextHandle,
    pub control: &'a RenderControl,
}

impl FrameCtx<'_> {
    /// Seconds since the previous frame.
    #[inline]
    pub fn dt(&self) -> f64 {
        self.time.dt
    }

    pub fn render_context(&self) -> Result<RenderContext> {
        self.context.current()
    }

    #[inline]
    pub fn is_back_most(&self) -> bool {
        self.depth_order == 0
    }
}
