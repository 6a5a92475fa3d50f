//! [`RecordingGl`]: an in-memory [`Gl`] for tests.
//!
//! It records every state-changing call, tracks which shader and program
//! names are alive, and imitates just enough of a driver to exercise the
//! compile/link protocol: sources with unbalanced delimiters or no `main`
//! fail to compile, a program links only with one vertex and one fragment
//! shader, and locations are assigned from `attribute` / `uniform`
//! declarations in declaration order.
//!
//! [`capture_logs`] runs a closure under a thread-local fmt subscriber and
//! returns what it logged.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::ffi::CStr;
use std::io;
use std::rc::Rc;
use std::sync::{Arc, Mutex, PoisonError};

use gl::types::{GLbitfield, GLenum, GLint, GLsizei, GLuint};
use num_traits::FromPrimitive;

use crate::api::Gl;
use crate::shader::ShaderStage;

/// A recorded GL call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateShader(ShaderStage),
    ShaderSource(GLuint),
    CompileShader(GLuint),
    DeleteShader(GLuint),
    CreateProgram(GLuint),
    AttachShader(GLuint, GLuint),
    DetachShader(GLuint, GLuint),
    LinkProgram(GLuint),
    DeleteProgram(GLuint),
    UseProgram(GLuint),
    AttribLocation(String),
    UniformLocation(String),
    ClearColor([f32; 4]),
    Clear(GLbitfield),
    Viewport(GLint, GLint, GLsizei, GLsizei),
    BindBuffer(GLenum, GLuint),
    VertexAttribPointer {
        index: GLuint,
        components: GLint,
        data: Vec<f32>,
    },
    EnableVertexAttribArray(GLuint),
    DisableVertexAttribArray(GLuint),
    UniformMatrix4fv {
        location: GLint,
        value: [f32; 16],
    },
    ActiveTexture(GLenum),
    BindTexture(GLenum, GLuint),
    DrawArrays {
        mode: GLenum,
        first: GLint,
        count: GLsizei,
    },
}

#[derive(Debug)]
struct FakeShader {
    stage: ShaderStage,
    source: String,
    log: Option<String>,
}

#[derive(Debug, Default)]
struct FakeProgram {
    attached: Vec<GLuint>,
    linked: bool,
    log: String,
    attributes: Vec<String>,
    uniforms: Vec<String>,
}

#[derive(Debug, Default)]
struct State {
    next_name: GLuint,
    shaders: BTreeMap<GLuint, FakeShader>,
    programs: BTreeMap<GLuint, FakeProgram>,
    calls: Vec<Call>,
    errors: VecDeque<GLenum>,
    array_buffer: GLuint,
    fail_creation: bool,
    fail_next_link: Option<String>,
}

impl State {
    fn allocate(&mut self) -> GLuint {
        self.next_name += 1;
        self.next_name
    }
}

/// Software stand-in for a GL ES 2.0 context.
///
/// Clones share one context, so a test can keep a handle to the calls made
/// by a value it has moved elsewhere.
#[derive(Debug, Default, Clone)]
pub struct RecordingGl {
    state: Rc<RefCell<State>>,
}

impl RecordingGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every recorded call so far.
    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Shader names created and not yet deleted.
    pub fn live_shaders(&self) -> Vec<GLuint> {
        self.state.borrow().shaders.keys().copied().collect()
    }

    /// Program names created and not yet deleted.
    pub fn live_programs(&self) -> Vec<GLuint> {
        self.state.borrow().programs.keys().copied().collect()
    }

    /// Make `glCreateShader` / `glCreateProgram` return 0.
    pub fn fail_object_creation(&self, fail: bool) {
        self.state.borrow_mut().fail_creation = fail;
    }

    /// Fail the next link with `log` as the driver diagnostic.
    pub fn fail_next_link(&self, log: &str) {
        self.state.borrow_mut().fail_next_link = Some(log.to_owned());
    }

    /// Queue a code for `glGetError` to report.
    pub fn push_error(&self, code: GLenum) {
        self.state.borrow_mut().errors.push_back(code);
    }

    /// Leave `buffer` bound to `GL_ARRAY_BUFFER` without recording a call,
    /// as a host drawing its own geometry would.
    pub fn host_binds_array_buffer(&self, buffer: GLuint) {
        self.state.borrow_mut().array_buffer = buffer;
    }

    /// Forget every object, as a context teardown would. Names handed out
    /// earlier become stale; new names keep counting upward.
    pub fn lose_context(&self) {
        let mut state = self.state.borrow_mut();
        state.shaders.clear();
        state.programs.clear();
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }
}

const LINK_STAGES_LOG: &str =
    "Link failed: one compiled vertex and one compiled fragment shader required";

/// Deliberately shallow syntax check.
fn check_syntax(source: &str) -> Result<(), String> {
    let mut depth: Vec<char> = Vec::new();
    for (line_no, line) in source.lines().enumerate() {
        for ch in line.chars() {
            match ch {
                '{' | '(' => depth.push(ch),
                '}' | ')' => {
                    let open = if ch == '}' { '{' } else { '(' };
                    if depth.pop() != Some(open) {
                        return Err(format!("ERROR: 0:{}: unexpected '{ch}'", line_no + 1));
                    }
                }
                _ => {}
            }
        }
    }
    if !depth.is_empty() {
        return Err("ERROR: 0:0: unexpected end of file".to_owned());
    }
    if !source.contains("void main(") {
        return Err("ERROR: 0:0: missing main function".to_owned());
    }
    Ok(())
}

/// Names declared by lines of the form `<keyword> <type> <name>;`.
fn declared(source: &str, keyword: &str) -> Vec<String> {
    source
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix(keyword))
        .filter_map(|rest| rest.split_whitespace().last())
        .map(|name| name.trim_end_matches(';').to_owned())
        .collect()
}

impl Gl for RecordingGl {
    fn create_shader(&self, kind: GLenum) -> GLuint {
        let Some(stage) = ShaderStage::from_u32(kind) else {
            return 0;
        };
        self.record(Call::CreateShader(stage));
        let mut state = self.state.borrow_mut();
        if state.fail_creation {
            return 0;
        }
        let name = state.allocate();
        state.shaders.insert(
            name,
            FakeShader {
                stage,
                source: String::new(),
                log: None,
            },
        );
        name
    }

    fn shader_source(&self, shader: GLuint, source: &str) {
        self.record(Call::ShaderSource(shader));
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader) {
            s.source = source.to_owned();
        }
    }

    fn compile_shader(&self, shader: GLuint) {
        self.record(Call::CompileShader(shader));
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader) {
            s.log = Some(check_syntax(&s.source).err().unwrap_or_default());
        }
    }

    fn shader_compile_status(&self, shader: GLuint) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .is_some_and(|s| s.log.as_deref() == Some(""))
    }

    fn shader_info_log(&self, shader: GLuint) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .and_then(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: GLuint) {
        self.record(Call::DeleteShader(shader));
        self.state.borrow_mut().shaders.remove(&shader);
    }

    fn create_program(&self) -> GLuint {
        let mut state = self.state.borrow_mut();
        if state.fail_creation {
            state.calls.push(Call::CreateProgram(0));
            return 0;
        }
        let name = state.allocate();
        state.programs.insert(name, FakeProgram::default());
        state.calls.push(Call::CreateProgram(name));
        name
    }

    fn is_program(&self, program: GLuint) -> bool {
        self.state.borrow().programs.contains_key(&program)
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        self.record(Call::AttachShader(program, shader));
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: GLuint, shader: GLuint) {
        self.record(Call::DetachShader(program, shader));
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.retain(|&s| s != shader);
        }
    }

    fn link_program(&self, program: GLuint) {
        self.record(Call::LinkProgram(program));
        let mut state = self.state.borrow_mut();
        let injected = state.fail_next_link.take();

        let Some(attached) = state.programs.get(&program).map(|p| p.attached.clone()) else {
            return;
        };
        let shaders: Vec<&FakeShader> = attached
            .iter()
            .filter_map(|name| state.shaders.get(name))
            .collect();
        let compiled = |stage| {
            shaders
                .iter()
                .filter(|s| s.stage == stage && s.log.as_deref() == Some(""))
                .count()
        };

        let outcome = if let Some(log) = injected {
            Err(log)
        } else if shaders.len() != 2
            || compiled(ShaderStage::Vertex) != 1
            || compiled(ShaderStage::Fragment) != 1
        {
            Err(LINK_STAGES_LOG.to_owned())
        } else {
            let mut attributes = Vec::new();
            let mut uniforms = Vec::new();
            for shader in &shaders {
                if shader.stage == ShaderStage::Vertex {
                    attributes.extend(declared(&shader.source, "attribute "));
                }
                for name in declared(&shader.source, "uniform ") {
                    if !uniforms.contains(&name) {
                        uniforms.push(name);
                    }
                }
            }
            Ok((attributes, uniforms))
        };

        if let Some(p) = state.programs.get_mut(&program) {
            match outcome {
                Ok((attributes, uniforms)) => {
                    p.linked = true;
                    p.log.clear();
                    p.attributes = attributes;
                    p.uniforms = uniforms;
                }
                Err(log) => {
                    p.linked = false;
                    p.log = log;
                    p.attributes.clear();
                    p.uniforms.clear();
                }
            }
        }
    }

    fn program_link_status(&self, program: GLuint) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: GLuint) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&self, program: GLuint) {
        self.record(Call::DeleteProgram(program));
        self.state.borrow_mut().programs.remove(&program);
    }

    fn use_program(&self, program: GLuint) {
        self.record(Call::UseProgram(program));
    }

    fn attrib_location(&self, program: GLuint, name: &CStr) -> GLint {
        let name = name.to_string_lossy().into_owned();
        self.record(Call::AttribLocation(name.clone()));
        self.state
            .borrow()
            .programs
            .get(&program)
            .filter(|p| p.linked)
            .and_then(|p| p.attributes.iter().position(|a| *a == name))
            .map_or(-1, |i| i as GLint)
    }

    fn uniform_location(&self, program: GLuint, name: &CStr) -> GLint {
        let name = name.to_string_lossy().into_owned();
        self.record(Call::UniformLocation(name.clone()));
        self.state
            .borrow()
            .programs
            .get(&program)
            .filter(|p| p.linked)
            .and_then(|p| p.uniforms.iter().position(|u| *u == name))
            .map_or(-1, |i| i as GLint)
    }

    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.record(Call::ClearColor([red, green, blue, alpha]));
    }

    fn clear(&self, mask: GLbitfield) {
        self.record(Call::Clear(mask));
    }

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        self.record(Call::Viewport(x, y, width, height));
    }

    fn array_buffer_binding(&self) -> GLuint {
        self.state.borrow().array_buffer
    }

    fn bind_buffer(&self, target: GLenum, buffer: GLuint) {
        self.record(Call::BindBuffer(target, buffer));
        if target == gl::ARRAY_BUFFER {
            self.state.borrow_mut().array_buffer = buffer;
        }
    }

    fn vertex_attrib_pointer(&self, index: GLuint, components: GLint, data: &'static [f32]) {
        assert_eq!(
            self.state.borrow().array_buffer,
            0,
            "client-side attribute array set while a buffer is bound"
        );
        self.record(Call::VertexAttribPointer {
            index,
            components,
            data: data.to_vec(),
        });
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        self.record(Call::EnableVertexAttribArray(index));
    }

    fn disable_vertex_attrib_array(&self, index: GLuint) {
        self.record(Call::DisableVertexAttribArray(index));
    }

    fn uniform_matrix4fv(&self, location: GLint, value: &[f32; 16]) {
        self.record(Call::UniformMatrix4fv {
            location,
            value: *value,
        });
    }

    fn active_texture(&self, unit: GLenum) {
        self.record(Call::ActiveTexture(unit));
    }

    fn bind_texture(&self, target: GLenum, texture: GLuint) {
        self.record(Call::BindTexture(target, texture));
    }

    fn draw_arrays(&self, mode: GLenum, first: GLint, count: GLsizei) {
        self.record(Call::DrawArrays { mode, first, count });
    }

    fn get_error(&self) -> GLenum {
        self.state
            .borrow_mut()
            .errors
            .pop_front()
            .unwrap_or(gl::NO_ERROR)
    }
}

/// Shared sink for [`capture_logs`].
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a plain-text subscriber installed on this thread only, and
/// return its result with everything logged meanwhile.
///
/// Lines read `LEVEL target: message field=value`.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let bytes = buffer.0.lock().unwrap_or_else(PoisonError::into_inner);
    (result, String::from_utf8_lossy(&bytes).into_owned())
}
