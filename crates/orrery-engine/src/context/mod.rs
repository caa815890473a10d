//! Render context levels.
//!
//! A render control publishes the GPU context level it is running on through a
//! [`ContextHandle`]. Components that need version-conditional behavior (e.g.
//! texture upload paths) query the handle instead of the platform.

mod current;
mod render_context;

pub use current::ContextHandle;
pub use render_context::{RenderContext, RenderContextType};
