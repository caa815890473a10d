use crate::context::RenderContextType;

/// Failures reported by the render-control core.
///
/// Every variant is either a precondition violation detected at the call site
/// (programmer error) or a state query made while the required state is absent.
/// Failures raised by client hooks are not represented here; they travel as
/// `anyhow::Error` and are absorbed at the render-loop boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ControlError {
    #[error("no current render context")]
    NoRenderContext,

    #[error("render context type conflict: {0:?} vs {1:?}")]
    ContextTypeConflict(RenderContextType, RenderContextType),

    #[error("unsupported render context type: {0:?}")]
    UnsupportedContextType(RenderContextType),

    #[error("invalid surface size {width}x{height}")]
    InvalidSurfaceSize { width: u32, height: u32 },

    #[error("invalid frame rate {0}; expected NaN, 0 or a positive finite value")]
    InvalidFrameRate(f64),

    #[error("animation is not registered with this delegate")]
    AnimationNotFound,

    #[error("invalid surface configuration: {0}")]
    InvalidSurfaceConfig(&'static str),

    #[error("depth order {depth} is out of range for {len} scene views")]
    DepthOrderOutOfRange { depth: usize, len: usize },
}

pub type Result<T, E = ControlError> = std::result::Result<T, E>;
