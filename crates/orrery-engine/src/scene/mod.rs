//! Scene and scene-view contracts.
//!
//! A scene owns content that is advanced each frame; a scene view paints some
//! view of that content onto the surface. Both compose a
//! [`RenderDelegate`](crate::delegate::RenderDelegate) through
//! [`Lifecycle`] and are registered with a
//! [`RenderControl`](crate::control::RenderControl) as `Arc<dyn Scene>` /
//! `Arc<dyn SceneView>`. Registration identity is the `Arc` allocation.

use crate::control::FrameCtx;
use crate::delegate::Lifecycle;

/// Content registered with a render control.
///
/// Scenes receive frame-start and frame-end events through their delegate
/// before any scene view does.
pub trait Scene: Lifecycle {}

/// Paints onto the render surface once per frame.
pub trait SceneView: Lifecycle {
    /// Draws this view. Called on the render thread between the frame-start
    /// and frame-end fan-outs, in depth order (back-most first).
    fn render_frame(&self, ctx: &FrameCtx<'_>) -> anyhow::Result<()>;
}
