//! Shader compiler: source text in, compiled shader object out.

use std::fmt;
use std::num::NonZeroU32;

use gl::types::{GLenum, GLuint};
use num_derive::FromPrimitive;
use tracing::{error, trace};

use crate::api::Gl;
use crate::error::GlError;

/// Programmable pipeline stage, valued as its GL shader-type enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u32)]
pub enum ShaderStage {
    /// `GL_VERTEX_SHADER`
    Vertex = 0x8B31,
    /// `GL_FRAGMENT_SHADER`
    Fragment = 0x8B30,
}

impl ShaderStage {
    pub fn gl_enum(self) -> GLenum {
        self as GLenum
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// A successfully compiled shader object.
///
/// Dropping this without [`delete`](CompiledShader::delete) or handing it to
/// [`link`](crate::program::link) leaks the GL object.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "compiled shaders must be linked or deleted"]
pub struct CompiledShader {
    name: NonZeroU32,
    stage: ShaderStage,
}

impl CompiledShader {
    pub fn name(&self) -> GLuint {
        self.name.get()
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn delete<G: Gl + ?Sized>(self, gl: &G) {
        gl.delete_shader(self.name.get());
    }
}

/// Compile `source` for `stage`.
///
/// On failure the driver log is reported at error level, the shader object
/// is deleted, and nothing stays allocated.
pub fn compile<G: Gl + ?Sized>(
    gl: &G,
    stage: ShaderStage,
    source: &str,
) -> Result<CompiledShader, GlError> {
    let name = NonZeroU32::new(gl.create_shader(stage.gl_enum())).ok_or_else(|| {
        error!(%stage, "glCreateShader returned 0");
        GlError::Create { kind: "shader" }
    })?;

    gl.shader_source(name.get(), source);
    gl.compile_shader(name.get());

    if !gl.shader_compile_status(name.get()) {
        let log = gl.shader_info_log(name.get());
        error!(%stage, "could not compile shader:\n{log}");
        gl.delete_shader(name.get());
        return Err(GlError::Compile { stage, log });
    }

    trace!(%stage, shader = name.get(), "compiled shader");
    Ok(CompiledShader { name, stage })
}
