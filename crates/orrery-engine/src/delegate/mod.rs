//! Per-scene and per-view frame hooks.
//!
//! A [`RenderDelegate`] holds the frame callbacks and animations of one scene
//! or scene view. Scenes and views own a delegate and expose it through
//! [`Lifecycle`], which the render control uses to drive initialize, restore
//! and destroy.

mod animation;
mod frame_callback;
mod lifecycle;
mod render_delegate;

use std::sync::Arc;

pub use animation::Animation;
pub use frame_callback::{FnFrameCallback, FrameCallback};
pub use lifecycle::Lifecycle;
pub use render_delegate::RenderDelegate;

/// Identity comparison for registered objects.
pub(crate) fn same_instance<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
