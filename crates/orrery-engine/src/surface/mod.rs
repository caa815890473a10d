//! Platform surface boundary.
//!
//! [`RenderSurface`] is what the render control needs from a platform view;
//! [`SurfaceRenderer`] is what the platform calls back on its render thread.
//! [`HeadlessSurface`] implements the platform side with a plain thread and
//! no display.

mod color;
mod config;
mod headless;
mod renderer;
mod size;

pub use color::Color;
pub use config::{AntiAliasing, ColorBits, SurfaceConfig};
pub use headless::HeadlessSurface;
pub use renderer::{RenderSurface, SurfaceRenderer};
pub use size::SurfaceSize;
