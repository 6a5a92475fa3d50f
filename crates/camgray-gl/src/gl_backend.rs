//! Raw OpenGL backend, calling into the host-provided GL context.

use std::ffi::{c_void, CStr};
use std::marker::PhantomData;
use std::sync::Once;

use anyhow::{bail, Result};
use gl::types::{GLbitfield, GLchar, GLenum, GLint, GLsizei, GLuint};

use crate::api::Gl;

static GL_INIT_ONCE: Once = Once::new();

/// [`Gl`] over the `gl` crate's global function pointers.
///
/// Function pointers are loaded exactly once per process; every `RawGl`
/// after the first shares them.
///
/// A `RawGl` is bound to the thread whose context was current when it was
/// loaded, so it is neither `Send` nor `Sync`:
///
/// ```compile_fail
/// fn assert_send<T: Send>() {}
/// assert_send::<camgray_gl::RawGl>();
/// ```
///
/// ```compile_fail
/// fn assert_sync<T: Sync>() {}
/// assert_sync::<camgray_gl::RawGl>();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RawGl {
    _thread_bound: PhantomData<*const ()>,
}

impl RawGl {
    /// Load GL entry points through a host-provided resolver such as
    /// `eglGetProcAddress`.
    ///
    /// # Safety
    ///
    /// The host's GL context must be current on this thread, here and for
    /// every later call made through the returned value. `loader` must
    /// return valid function pointers (or null) for the names it is given.
    pub unsafe fn load_with<F>(loader: F) -> Result<Self>
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        GL_INIT_ONCE.call_once(|| gl::load_with(loader));
        Self::verify()
    }

    unsafe fn verify() -> Result<Self> {
        let required = [
            ("glCreateShader", gl::CreateShader::is_loaded()),
            ("glLinkProgram", gl::LinkProgram::is_loaded()),
            (
                "glVertexAttribPointer",
                gl::VertexAttribPointer::is_loaded(),
            ),
            ("glUniformMatrix4fv", gl::UniformMatrix4fv::is_loaded()),
            ("glDrawArrays", gl::DrawArrays::is_loaded()),
        ];
        if let Some((name, _)) = required.iter().find(|(_, loaded)| !loaded) {
            bail!("GL entry point {name} could not be loaded");
        }
        if gl::GetString(gl::VERSION).is_null() {
            bail!("no GL context is current on this thread");
        }
        tracing::debug!("GL entry points loaded");
        Ok(Self {
            _thread_bound: PhantomData,
        })
    }
}

/// Read a driver info log of `len` bytes into an owned buffer.
fn read_info_log(len: GLint, fetch: impl FnOnce(GLsizei, *mut GLsizei, *mut GLchar)) -> String {
    if len <= 0 {
        return String::new();
    }
    let mut buf = vec![0u8; len as usize];
    let mut written: GLsizei = 0;
    fetch(len, &mut written, buf.as_mut_ptr().cast());
    buf.truncate(written.clamp(0, len) as usize);
    String::from_utf8_lossy(&buf).trim_end().to_owned()
}

// SAFETY (all blocks below): a `RawGl` only exists after `verify` confirmed
// the entry points are loaded and a context is current; the caller of
// `load_with` promised the context stays current on this thread.
impl Gl for RawGl {
    fn create_shader(&self, kind: GLenum) -> GLuint {
        unsafe { gl::CreateShader(kind) }
    }

    fn shader_source(&self, shader: GLuint, source: &str) {
        let ptr = source.as_ptr() as *const GLchar;
        let len = source.len() as GLint;
        unsafe { gl::ShaderSource(shader, 1, &ptr, &len) }
    }

    fn compile_shader(&self, shader: GLuint) {
        unsafe { gl::CompileShader(shader) }
    }

    fn shader_compile_status(&self, shader: GLuint) -> bool {
        let mut status = 0;
        unsafe { gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status) };
        status != 0
    }

    fn shader_info_log(&self, shader: GLuint) -> String {
        let mut len = 0;
        unsafe { gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len) };
        read_info_log(len, |cap, written, buf| unsafe {
            gl::GetShaderInfoLog(shader, cap, written, buf)
        })
    }

    fn delete_shader(&self, shader: GLuint) {
        unsafe { gl::DeleteShader(shader) }
    }

    fn create_program(&self) -> GLuint {
        unsafe { gl::CreateProgram() }
    }

    fn is_program(&self, program: GLuint) -> bool {
        unsafe { gl::IsProgram(program) == gl::TRUE }
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::AttachShader(program, shader) }
    }

    fn detach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::DetachShader(program, shader) }
    }

    fn link_program(&self, program: GLuint) {
        unsafe { gl::LinkProgram(program) }
    }

    fn program_link_status(&self, program: GLuint) -> bool {
        let mut status = gl::FALSE as GLint;
        unsafe { gl::GetProgramiv(program, gl::LINK_STATUS, &mut status) };
        status == gl::TRUE as GLint
    }

    fn program_info_log(&self, program: GLuint) -> String {
        let mut len = 0;
        unsafe { gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len) };
        read_info_log(len, |cap, written, buf| unsafe {
            gl::GetProgramInfoLog(program, cap, written, buf)
        })
    }

    fn delete_program(&self, program: GLuint) {
        unsafe { gl::DeleteProgram(program) }
    }

    fn use_program(&self, program: GLuint) {
        unsafe { gl::UseProgram(program) }
    }

    fn attrib_location(&self, program: GLuint, name: &CStr) -> GLint {
        unsafe { gl::GetAttribLocation(program, name.as_ptr()) }
    }

    fn uniform_location(&self, program: GLuint, name: &CStr) -> GLint {
        unsafe { gl::GetUniformLocation(program, name.as_ptr()) }
    }

    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        unsafe { gl::ClearColor(red, green, blue, alpha) }
    }

    fn clear(&self, mask: GLbitfield) {
        unsafe { gl::Clear(mask) }
    }

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        unsafe { gl::Viewport(x, y, width, height) }
    }

    fn array_buffer_binding(&self) -> GLuint {
        let mut buffer = 0;
        unsafe { gl::GetIntegerv(gl::ARRAY_BUFFER_BINDING, &mut buffer) };
        GLuint::try_from(buffer).unwrap_or(0)
    }

    fn bind_buffer(&self, target: GLenum, buffer: GLuint) {
        unsafe { gl::BindBuffer(target, buffer) }
    }

    fn vertex_attrib_pointer(&self, index: GLuint, components: GLint, data: &'static [f32]) {
        unsafe {
            gl::VertexAttribPointer(
                index,
                components,
                gl::FLOAT,
                gl::FALSE,
                0,
                data.as_ptr().cast(),
            )
        }
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        unsafe { gl::EnableVertexAttribArray(index) }
    }

    fn disable_vertex_attrib_array(&self, index: GLuint) {
        unsafe { gl::DisableVertexAttribArray(index) }
    }

    fn uniform_matrix4fv(&self, location: GLint, value: &[f32; 16]) {
        unsafe { gl::UniformMatrix4fv(location, 1, gl::FALSE, value.as_ptr()) }
    }

    fn active_texture(&self, unit: GLenum) {
        unsafe { gl::ActiveTexture(unit) }
    }

    fn bind_texture(&self, target: GLenum, texture: GLuint) {
        unsafe { gl::BindTexture(target, texture) }
    }

    fn draw_arrays(&self, mode: GLenum, first: GLint, count: GLsizei) {
        unsafe { gl::DrawArrays(mode, first, count) }
    }

    fn get_error(&self) -> GLenum {
        unsafe { gl::GetError() }
    }
}
