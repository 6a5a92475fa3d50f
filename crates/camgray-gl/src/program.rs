//! Program linker and location lookup.

use std::ffi::CStr;
use std::num::NonZeroU32;

use gl::types::{GLint, GLuint};
use tracing::{debug, error};

use crate::api::Gl;
use crate::error::GlError;
use crate::shader::{compile, CompiledShader, ShaderStage};

/// A linked, executable program object.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "linked programs must be kept or deleted"]
pub struct LinkedProgram {
    name: NonZeroU32,
}

impl LinkedProgram {
    pub fn name(&self) -> GLuint {
        self.name.get()
    }

    /// Whether the name still refers to a program in the current context.
    ///
    /// Returns `false` after context loss, when the name is stale.
    pub fn is_valid<G: Gl + ?Sized>(&self, gl: &G) -> bool {
        gl.is_program(self.name.get())
    }

    pub fn attrib_location<G: Gl + ?Sized>(&self, gl: &G, name: &CStr) -> Result<GLuint, GlError> {
        let location = gl.attrib_location(self.name.get(), name);
        GLuint::try_from(location).map_err(|_| missing(name))
    }

    pub fn uniform_location<G: Gl + ?Sized>(&self, gl: &G, name: &CStr) -> Result<GLint, GlError> {
        match gl.uniform_location(self.name.get(), name) {
            -1 => Err(missing(name)),
            location => Ok(location),
        }
    }

    pub fn delete<G: Gl + ?Sized>(self, gl: &G) {
        gl.delete_program(self.name.get());
    }
}

fn missing(name: &CStr) -> GlError {
    let name = name.to_string_lossy().into_owned();
    error!(%name, "location not found in linked program");
    GlError::MissingLocation { name }
}

/// Link a vertex and a fragment shader into a program.
///
/// Both shaders are consumed: they are deleted whether or not linking
/// succeeds. Swapped stages are rejected before any program object exists.
pub fn link<G: Gl + ?Sized>(
    gl: &G,
    vertex: CompiledShader,
    fragment: CompiledShader,
) -> Result<LinkedProgram, GlError> {
    if vertex.stage() != ShaderStage::Vertex || fragment.stage() != ShaderStage::Fragment {
        let log = format!(
            "expected a vertex and a fragment shader, got {} and {}",
            vertex.stage(),
            fragment.stage()
        );
        error!("could not link program:\n{log}");
        vertex.delete(gl);
        fragment.delete(gl);
        return Err(GlError::Link { log });
    }

    let Some(name) = NonZeroU32::new(gl.create_program()) else {
        error!("glCreateProgram returned 0");
        vertex.delete(gl);
        fragment.delete(gl);
        return Err(GlError::Create { kind: "program" });
    };

    gl.attach_shader(name.get(), vertex.name());
    gl.attach_shader(name.get(), fragment.name());
    gl.link_program(name.get());

    // The program keeps its own copy of the linked code.
    gl.detach_shader(name.get(), vertex.name());
    gl.detach_shader(name.get(), fragment.name());
    vertex.delete(gl);
    fragment.delete(gl);

    if !gl.program_link_status(name.get()) {
        let log = gl.program_info_log(name.get());
        error!("could not link program:\n{log}");
        gl.delete_program(name.get());
        return Err(GlError::Link { log });
    }

    debug!(program = name.get(), "linked program");
    Ok(LinkedProgram { name })
}

/// Compile both stages and link them, stopping at the first failure.
pub fn build_program<G: Gl + ?Sized>(
    gl: &G,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<LinkedProgram, GlError> {
    let vertex = compile(gl, ShaderStage::Vertex, vertex_source)?;
    let fragment = match compile(gl, ShaderStage::Fragment, fragment_source) {
        Ok(shader) => shader,
        Err(err) => {
            vertex.delete(gl);
            return Err(err);
        }
    };
    link(gl, vertex, fragment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{capture_logs, Call, RecordingGl};

    const VERTEX: &str = "attribute vec4 vPosition;\nattribute vec2 vTexCoord;\n\
        varying vec2 uv;\nuniform mat4 uMatrix;\n\
        void main() {\n  gl_Position = vPosition;\n  uv = (uMatrix * vec4(vTexCoord, 0.0, 1.0)).xy;\n}\n";
    const FRAGMENT: &str = "precision mediump float;\nvarying vec2 uv;\nuniform sampler2D sTex;\n\
        void main() {\n  gl_FragColor = texture2D(sTex, uv);\n}\n";

    fn creates_program(call: &Call) -> bool {
        matches!(call, Call::CreateProgram(_))
    }

    /// The error-level event logged by `program.rs`, from its first line on.
    fn link_error(logs: &str) -> &str {
        let start = logs
            .find("ERROR camgray_gl::program:")
            .unwrap_or_else(|| panic!("no error event in {logs:?}"));
        &logs[start..]
    }

    #[test]
    fn links_and_resolves_locations() {
        let gl = RecordingGl::new();
        let program = build_program(&gl, VERTEX, FRAGMENT).unwrap();

        assert_eq!(program.attrib_location(&gl, c"vPosition"), Ok(0));
        assert_eq!(program.attrib_location(&gl, c"vTexCoord"), Ok(1));
        assert!(program.uniform_location(&gl, c"uMatrix").unwrap() >= 0);
        assert_eq!(
            program.attrib_location(&gl, c"vColor"),
            Err(GlError::MissingLocation {
                name: "vColor".into()
            })
        );

        // Shaders are released once the program is linked.
        assert!(gl.live_shaders().is_empty());
        assert_eq!(gl.live_programs(), vec![program.name()]);
        assert!(program.is_valid(&gl));
    }

    #[test]
    fn swapped_stages_fail_without_creating_a_program() {
        let gl = RecordingGl::new();
        let first = compile(&gl, ShaderStage::Fragment, FRAGMENT).unwrap();
        let second = compile(&gl, ShaderStage::Fragment, FRAGMENT).unwrap();

        let (result, logs) = capture_logs(|| link(&gl, first, second));

        let err = result.unwrap_err();
        assert!(matches!(err, GlError::Link { ref log } if log.contains("vertex")));
        let event = link_error(&logs);
        assert!(event.contains("could not link program"), "{event}");
        assert!(event.contains("got fragment and fragment"), "{event}");
        assert!(!gl.calls().iter().any(creates_program));
        assert!(gl.live_shaders().is_empty());
        assert!(gl.live_programs().is_empty());
    }

    #[test]
    fn driver_link_failure_deletes_the_program() {
        let gl = RecordingGl::new();
        gl.fail_next_link("L0001: varying uv not written");

        let (result, logs) = capture_logs(|| build_program(&gl, VERTEX, FRAGMENT));

        assert_eq!(
            result.unwrap_err(),
            GlError::Link {
                log: "L0001: varying uv not written".into()
            }
        );
        let event = link_error(&logs);
        assert!(event.contains("could not link program"), "{event}");
        assert!(event.contains("L0001: varying uv not written"), "{event}");
        assert!(gl.live_programs().is_empty());
        assert!(gl.live_shaders().is_empty());
    }

    #[test]
    fn fragment_failure_releases_the_vertex_shader() {
        let gl = RecordingGl::new();

        let err = build_program(&gl, VERTEX, "void main() {").unwrap_err();

        assert!(matches!(
            err,
            GlError::Compile {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
        assert!(gl.live_shaders().is_empty());
        assert!(!gl.calls().iter().any(creates_program));
    }

    #[test]
    fn vertex_failure_short_circuits() {
        let gl = RecordingGl::new();

        let err = build_program(&gl, "void main() {", FRAGMENT).unwrap_err();

        assert!(matches!(
            err,
            GlError::Compile {
                stage: ShaderStage::Vertex,
                ..
            }
        ));
        let created = gl
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::CreateShader(_)))
            .count();
        assert_eq!(created, 1);
    }

    #[test]
    fn stale_program_is_not_valid() {
        let gl = RecordingGl::new();
        let program = build_program(&gl, VERTEX, FRAGMENT).unwrap();

        gl.lose_context();

        assert!(!program.is_valid(&gl));
    }
}
