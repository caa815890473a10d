//! Time subsystem.
//!
//! Frame timing utilities kept independent of the render control so they can
//! be tested with synthetic timestamps:
//! - one `FrameClock` per render control, reset whenever frames start
//! - one `FpsMeter` per render control for coarse diagnostics

mod fps;
mod frame_clock;

pub use fps::FpsMeter;
pub use frame_clock::{FrameClock, FrameTime};
