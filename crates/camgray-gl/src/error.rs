use thiserror::Error;

use crate::shader::ShaderStage;

/// Failures reported while building a GL program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GlError {
    /// `glCreateShader` / `glCreateProgram` returned 0.
    #[error("driver could not create a {kind} object")]
    Create { kind: &'static str },
    #[error("could not compile {stage} shader:\n{log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("could not link program:\n{log}")]
    Link { log: String },
    #[error("`{name}` is not an active input of the linked program")]
    MissingLocation { name: String },
}
