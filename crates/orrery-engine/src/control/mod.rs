//! Render control: frame lifecycle and scene registry of one surface.

mod client;
mod config;
mod ctx;
mod render_control;
mod scheduler;

pub use client::RenderControlClient;
pub use config::{is_valid_frame_rate, RenderControlConfig, USE_CONTINUOUS_RENDERING, USE_DISPLAY_REFRESH_RATE};
pub use ctx::FrameCtx;
pub use render_control::RenderControl;
