use camgray_core::InputError;
use camgray_gl::GlError;
use thiserror::Error;

/// Why a lifecycle call rendered nothing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    /// Shader compilation, program linking, or location lookup failed.
    #[error(transparent)]
    Gl(#[from] GlError),
    /// No program has been built since the last surface creation.
    #[error("renderer has no linked program")]
    NotReady,
    /// The frame named texture 0.
    #[error("frame has no camera texture")]
    InvalidTexture,
    #[error(transparent)]
    Input(#[from] InputError),
}
