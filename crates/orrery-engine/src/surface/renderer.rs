use super::Color;
use crate::context::RenderContextType;
use crate::error::Result;
use crate::task::Job;

/// Platform side of a render surface, consumed by the render control.
///
/// The platform owns the render thread and the main thread; the render control
/// only ever reaches them through the two `queue_*` methods.
pub trait RenderSurface: Send + Sync {
    fn is_transparent(&self) -> bool;

    /// `true` stops continuous drawing; frames are then drawn only after
    /// [`request_frame_render`](Self::request_frame_render) or a display sync.
    fn set_render_frames_on_request(&self, on_request: bool);

    /// Starts or stops issuing one frame request per display refresh.
    fn set_display_sync_frames(&self, enabled: bool);

    /// Asks the platform to call [`SurfaceRenderer::on_render_frame`] at its
    /// next opportunity. Requests made before that frame runs are coalesced.
    fn request_frame_render(&self);

    fn queue_to_render_thread(&self, job: Job);

    fn queue_to_main_thread(&self, job: Job);

    /// Refresh rate of the display the surface is shown on, in Hz.
    fn display_refresh_rate(&self) -> f64;

    /// Clears the surface to `color` at the start of a frame.
    fn paint_background(&self, color: Color) {
        let _ = color;
    }
}

/// Render-thread entry points the platform drives.
///
/// Except for pause and resume, every method is called on the render thread.
pub trait SurfaceRenderer: Send + Sync {
    /// A render context became current on the calling thread.
    fn on_render_context_acquired(&self, api: RenderContextType, major: u32, minor: u32);

    /// The surface was (re)sized; both dimensions must be non-zero.
    fn on_surface_size_changed(&self, width: u32, height: u32) -> Result<()>;

    fn on_render_frame(&self);

    /// The render context went away; GPU resources are gone with it.
    fn on_render_context_lost(&self);

    fn on_render_thread_pause(&self);

    fn on_render_thread_resume(&self);
}
