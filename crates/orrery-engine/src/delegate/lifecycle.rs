use super::RenderDelegate;

/// Lifecycle hooks shared by scenes and scene views.
///
/// Implementors own a [`RenderDelegate`] and supply the three hooks; the render
/// control drives them on the render thread:
/// - `initialize` once ever, on the first add
/// - `restore` on a re-add after removal, or after the render context was
///   re-created while registered
/// - `destroy` on every removal
///
/// Hook errors are not handled here. They reach the render-loop boundary,
/// which logs them and keeps the render thread alive.
pub trait Lifecycle: Send + Sync {
    fn render_delegate(&self) -> &RenderDelegate;

    /// Creates content and acquires the GPU resources needed for the next frame.
    fn initialize(&self) -> anyhow::Result<()>;

    /// Re-acquires GPU resources for existing content after a context loss.
    fn restore(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Releases GPU resources.
    fn destroy(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Name used in diagnostics.
    fn label(&self) -> &str {
        "delegate"
    }
}
