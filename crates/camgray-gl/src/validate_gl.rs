//! Inspect the error state of the OpenGL context.

use gl::types::GLenum;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use tracing::warn;

use crate::api::Gl;

/// Upper bound on `glGetError` polls per drain. A lost context may keep
/// reporting errors forever.
const MAX_DRAINED_ERRORS: usize = 16;

/// Error codes `glGetError` can report on GL ES 2.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u32)]
pub enum GlErrorCode {
    InvalidEnum = 0x0500,
    InvalidValue = 0x0501,
    InvalidOperation = 0x0502,
    OutOfMemory = 0x0505,
    InvalidFramebufferOperation = 0x0506,
}

/// Pop every pending GL error, logging each at warn level.
///
/// Returns the raw codes in the order the driver reported them.
pub fn drain_errors<G: Gl + ?Sized>(gl: &G, context: &str) -> Vec<GLenum> {
    let mut codes = Vec::new();
    while codes.len() < MAX_DRAINED_ERRORS {
        let code = gl.get_error();
        if code == gl::NO_ERROR {
            break;
        }
        match GlErrorCode::from_u32(code) {
            Some(known) => warn!(context, error = ?known, "GL error"),
            None => warn!(context, "GL error 0x{code:04X}"),
        }
        codes.push(code);
    }
    codes
}
