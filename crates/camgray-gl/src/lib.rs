//! OpenGL ES plumbing for the camgray renderer.
//!
//! - [`Gl`] is the seam listing every GL entry point the renderer touches.
//! - [`RawGl`] implements it over the `gl` crate's loaded function pointers,
//!   inside a context the host has already made current.
//! - [`shader::compile`] and [`program::link`] turn source text into a
//!   [`LinkedProgram`], logging driver diagnostics on failure.
//!
//! ### Warning
//!
//! Every call assumes the host's GL context is current on the calling
//! thread. Nothing here creates or switches contexts.

mod api;
mod error;
mod gl_backend;
pub mod program;
pub mod shader;
pub mod validate_gl;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use api::{Gl, TEXTURE_EXTERNAL_OES};
pub use error::GlError;
pub use gl_backend::RawGl;
pub use program::{build_program, link, LinkedProgram};
pub use shader::{compile, CompiledShader, ShaderStage};
