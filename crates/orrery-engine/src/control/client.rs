use super::RenderControl;
use crate::surface::SurfaceSize;

/// Application-side listener for render-control availability.
///
/// All notifications arrive on the render thread.
pub trait RenderControlClient: Send + Sync {
    /// The surface has its first valid size and frames are running. Called
    /// once per context acquisition.
    fn on_render_control_available(&self, control: &RenderControl, initial_size: SurfaceSize);

    fn on_surface_size_changed(&self, size: SurfaceSize) {
        let _ = size;
    }

    /// The render context was lost; registrations survive, GPU resources do not.
    fn on_render_control_unavailable(&self) {}
}
