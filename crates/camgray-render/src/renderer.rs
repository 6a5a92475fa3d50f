//! [`FrameRenderer`]: program ownership and the per-frame draw.

use camgray_core::{FrameInput, SurfaceSize};
use camgray_gl::validate_gl::drain_errors;
use camgray_gl::{build_program, Gl, GlError, LinkedProgram, TEXTURE_EXTERNAL_OES};
use gl::types::{GLint, GLuint};
use tracing::{debug, error, trace, warn};

use crate::config::{RendererConfig, ZeroTexturePolicy};
use crate::error::RenderError;
use crate::geometry::{COMPONENTS, QUAD_POSITIONS, QUAD_TEX_COORDS, VERTEX_COUNT};
use crate::shaders::{
    FRAGMENT_SHADER_GRAYSCALE, POSITION_ATTRIBUTE, TEX_COORD_ATTRIBUTE, TRANSFORM_UNIFORM,
    VERTEX_SHADER,
};

/// The linked program and the locations resolved from it. Locations are
/// only meaningful for this program.
#[derive(Debug)]
struct ReadyProgram {
    program: LinkedProgram,
    position: GLuint,
    tex_coord: GLuint,
    transform: GLint,
}

impl ReadyProgram {
    fn build<G: Gl>(gl: &G) -> Result<Self, GlError> {
        let program = build_program(gl, VERTEX_SHADER, FRAGMENT_SHADER_GRAYSCALE)?;

        let locations = program
            .attrib_location(gl, POSITION_ATTRIBUTE)
            .and_then(|position| {
                let tex_coord = program.attrib_location(gl, TEX_COORD_ATTRIBUTE)?;
                let transform = program.uniform_location(gl, TRANSFORM_UNIFORM)?;
                Ok((position, tex_coord, transform))
            });

        match locations {
            Ok((position, tex_coord, transform)) => Ok(Self {
                program,
                position,
                tex_coord,
                transform,
            }),
            Err(err) => {
                program.delete(gl);
                Err(err)
            }
        }
    }
}

/// Renders the camera's external texture as grayscale, one frame per call.
///
/// Owns the GL program for the lifetime of the rendering surface. All
/// methods must be called from the host's rendering thread with its context
/// current.
///
/// Call [`release`](Self::release) before the context goes away. Dropping a
/// renderer that still holds a program deletes it, which needs the context
/// to be current at that point.
#[derive(Debug)]
pub struct FrameRenderer<G: Gl> {
    gl: G,
    config: RendererConfig,
    ready: Option<ReadyProgram>,
    viewport: Option<SurfaceSize>,
}

impl<G: Gl> FrameRenderer<G> {
    pub fn new(gl: G, config: RendererConfig) -> Self {
        Self {
            gl,
            config,
            ready: None,
            viewport: None,
        }
    }

    pub fn gl(&self) -> &G {
        &self.gl
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Whether a linked program is available for drawing.
    pub fn is_ready(&self) -> bool {
        self.ready.is_some()
    }

    /// The last accepted surface size.
    pub fn viewport(&self) -> Option<SurfaceSize> {
        self.viewport
    }

    /// Compile, link and resolve locations for a fresh surface.
    ///
    /// Callable again after context loss. A program that is still alive in
    /// the current context is deleted first; a stale one is dropped without
    /// GL calls. On failure the renderer stays not ready until the next
    /// successful call.
    pub fn on_surface_created(&mut self) -> Result<(), RenderError> {
        self.discard_program();

        let ready = ReadyProgram::build(&self.gl).map_err(|err| {
            error!("could not create program: {err}");
            RenderError::from(err)
        })?;

        debug!(
            program = ready.program.name(),
            position = ready.position,
            tex_coord = ready.tex_coord,
            transform = ready.transform,
            "grayscale program ready"
        );

        self.gl.clear_color(0.0, 0.0, 0.0, 1.0);
        if let Some(size) = self.viewport {
            self.apply_viewport(size);
        }
        self.ready = Some(ready);
        Ok(())
    }

    /// Cover `width` x `height` device pixels.
    ///
    /// Zero or negative sizes are rejected without a GL call. A valid size
    /// that arrives before the program is ready is remembered and applied
    /// by [`on_surface_created`](Self::on_surface_created).
    pub fn on_surface_changed(&mut self, width: i32, height: i32) -> Result<(), RenderError> {
        let size = SurfaceSize::new(width, height).map_err(|err| {
            warn!("ignoring surface change: {err}");
            RenderError::from(err)
        })?;
        self.viewport = Some(size);

        if self.ready.is_none() {
            debug!(
                width,
                height,
                "surface size stored until the program is ready"
            );
            return Err(RenderError::NotReady);
        }
        self.apply_viewport(size);
        Ok(())
    }

    /// Draw one frame from a camera texture and its capture transform.
    pub fn on_draw_frame(
        &mut self,
        texture: u32,
        transform: &[f32; 16],
    ) -> Result<(), RenderError> {
        self.draw(&FrameInput::new(texture, transform))
    }

    /// Draw one frame. Issues no GL calls unless the frame can be drawn.
    pub fn draw(&mut self, input: &FrameInput<'_>) -> Result<(), RenderError> {
        let Some(ready) = &self.ready else {
            trace!("frame skipped: no program");
            return Err(RenderError::NotReady);
        };
        if input.texture == 0 && self.config.zero_texture == ZeroTexturePolicy::Skip {
            trace!("frame skipped: texture 0");
            return Err(RenderError::InvalidTexture);
        }

        let gl = &self.gl;
        gl.clear(gl::COLOR_BUFFER_BIT);
        gl.use_program(ready.program.name());

        // Client-side arrays are only read as such with no buffer bound.
        let host_buffer = gl.array_buffer_binding();
        if host_buffer != 0 {
            gl.bind_buffer(gl::ARRAY_BUFFER, 0);
        }

        gl.vertex_attrib_pointer(ready.position, COMPONENTS, &QUAD_POSITIONS);
        gl.enable_vertex_attrib_array(ready.position);
        gl.vertex_attrib_pointer(ready.tex_coord, COMPONENTS, &QUAD_TEX_COORDS);
        gl.enable_vertex_attrib_array(ready.tex_coord);

        gl.uniform_matrix4fv(ready.transform, input.transform);

        gl.active_texture(gl::TEXTURE0);
        gl.bind_texture(TEXTURE_EXTERNAL_OES, input.texture);

        gl.draw_arrays(gl::TRIANGLE_STRIP, 0, VERTEX_COUNT);

        // Leave no enabled arrays behind for other renderers on this context.
        gl.disable_vertex_attrib_array(ready.position);
        gl.disable_vertex_attrib_array(ready.tex_coord);
        if host_buffer != 0 {
            gl.bind_buffer(gl::ARRAY_BUFFER, host_buffer);
        }

        if self.config.check_errors {
            drain_errors(gl, "draw frame");
        }
        trace!(texture = input.texture, "frame drawn");
        Ok(())
    }

    /// Delete the program, if any. The renderer is not ready afterwards.
    ///
    /// Must run while the context is current. Once released, neither a
    /// second call nor dropping the renderer touches GL.
    pub fn release(&mut self) {
        self.discard_program();
    }

    fn discard_program(&mut self) {
        let Some(old) = self.ready.take() else {
            return;
        };
        if old.program.is_valid(&self.gl) {
            debug!(program = old.program.name(), "deleting previous program");
            old.program.delete(&self.gl);
        } else {
            debug!(
                program = old.program.name(),
                "previous program went away with its context"
            );
        }
    }

    fn apply_viewport(&self, size: SurfaceSize) {
        debug!(width = size.width(), height = size.height(), "viewport");
        self.gl.viewport(0, 0, size.width(), size.height());
    }
}

/// Releases a program still held. Issues no GL calls after
/// [`release`](FrameRenderer::release).
impl<G: Gl> Drop for FrameRenderer<G> {
    fn drop(&mut self) {
        self.release();
    }
}
