//! Render tasks.
//!
//! All mutation of render-owned state from arbitrary threads is expressed as a
//! [`RenderTask`] closure queued to the render thread, where tasks run one at a
//! time in submission order, never interleaved with a frame.

mod boundary;
mod render_task;

pub(crate) use boundary::{run_guarded, run_guarded_unit};
pub use render_task::{CallbackDispatch, Job, RenderTask, TaskOutcome};
