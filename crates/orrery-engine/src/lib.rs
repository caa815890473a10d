//! Orrery engine crate.
//!
//! Render-thread control and frame lifecycle of the orrery 3D engine: render
//! context levels, render tasks, per-scene frame hooks and the render control
//! that drives a platform surface.
//!
//! A platform integration implements [`surface::RenderSurface`] and forwards its
//! render-thread events to a [`control::RenderControl`], which it holds as a
//! [`surface::SurfaceRenderer`]. Applications register [`scene::Scene`]s and
//! [`scene::SceneView`]s with the control from any thread.

pub mod context;
pub mod control;
pub mod delegate;
pub mod error;
pub mod logging;
pub mod scene;
pub mod surface;
pub mod task;
pub mod time;

#[cfg(test)]
mod testing;

pub use control::{RenderControl, RenderControlClient, RenderControlConfig};
pub use error::{ControlError, Result};
