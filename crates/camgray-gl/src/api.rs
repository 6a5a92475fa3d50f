//! The [`Gl`] trait: the GL ES 2.0 surface area used by the renderer.

use std::ffi::CStr;

use gl::types::{GLbitfield, GLenum, GLint, GLsizei, GLuint};

/// `GL_TEXTURE_EXTERNAL_OES` from `OES_EGL_image_external`. Not part of the
/// desktop bindings generated by the `gl` crate.
pub const TEXTURE_EXTERNAL_OES: GLenum = 0x8D65;

/// GL entry points in the shape the renderer uses them.
///
/// Methods mirror their `gl*` namesakes. Query-style calls return their
/// result instead of writing through an out pointer; info logs come back as
/// owned strings.
pub trait Gl {
    fn create_shader(&self, kind: GLenum) -> GLuint;
    fn shader_source(&self, shader: GLuint, source: &str);
    fn compile_shader(&self, shader: GLuint);
    fn shader_compile_status(&self, shader: GLuint) -> bool;
    fn shader_info_log(&self, shader: GLuint) -> String;
    fn delete_shader(&self, shader: GLuint);

    fn create_program(&self) -> GLuint;
    fn is_program(&self, program: GLuint) -> bool;
    fn attach_shader(&self, program: GLuint, shader: GLuint);
    fn detach_shader(&self, program: GLuint, shader: GLuint);
    fn link_program(&self, program: GLuint);
    fn program_link_status(&self, program: GLuint) -> bool;
    fn program_info_log(&self, program: GLuint) -> String;
    fn delete_program(&self, program: GLuint);
    fn use_program(&self, program: GLuint);

    /// -1 when `name` is not an active attribute.
    fn attrib_location(&self, program: GLuint, name: &CStr) -> GLint;
    /// -1 when `name` is not an active uniform.
    fn uniform_location(&self, program: GLuint, name: &CStr) -> GLint;

    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32);
    fn clear(&self, mask: GLbitfield);
    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei);

    /// Name bound to `GL_ARRAY_BUFFER`, 0 when none is.
    fn array_buffer_binding(&self) -> GLuint;
    fn bind_buffer(&self, target: GLenum, buffer: GLuint);

    /// Point attribute `index` at a client-side float array, tightly packed.
    ///
    /// The driver reads `data` at draw time, so it must outlive every draw
    /// that uses it; hence `'static`. No buffer may be bound to
    /// `GL_ARRAY_BUFFER` at the time of the call, or `data` is taken as an
    /// offset into that buffer.
    fn vertex_attrib_pointer(&self, index: GLuint, components: GLint, data: &'static [f32]);
    fn enable_vertex_attrib_array(&self, index: GLuint);
    fn disable_vertex_attrib_array(&self, index: GLuint);

    /// Upload one column-major matrix. The driver copies `value`.
    fn uniform_matrix4fv(&self, location: GLint, value: &[f32; 16]);

    fn active_texture(&self, unit: GLenum);
    fn bind_texture(&self, target: GLenum, texture: GLuint);
    fn draw_arrays(&self, mode: GLenum, first: GLint, count: GLsizei);

    fn get_error(&self) -> GLenum;
}
