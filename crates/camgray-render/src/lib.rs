//! Grayscale camera preview renderer.
//!
//! [`FrameRenderer`] is driven by the host's render loop, one call per
//! lifecycle event, all on the rendering thread:
//!
//! - [`FrameRenderer::on_surface_created`] compiles and links the shaders and
//!   caches attribute/uniform locations.
//! - [`FrameRenderer::on_surface_changed`] sets the viewport.
//! - [`FrameRenderer::on_draw_frame`] paints the camera's external texture
//!   over the whole viewport, converted to gray in the fragment shader.
//!
//! Failures never cross back into the host: they are logged and the frame
//! renders nothing, while the returned [`RenderError`] is there for callers
//! that want it.
//!
//! ```rust,ignore
//! let gl = unsafe { RawGl::load_with(|s| egl_get_proc_address(s))? };
//! let mut renderer = FrameRenderer::new(gl, RendererConfig::default());
//!
//! let _ = renderer.on_surface_created();
//! let _ = renderer.on_surface_changed(width, height);
//! // every frame, after SurfaceTexture.updateTexImage():
//! let _ = renderer.on_draw_frame(texture_id, &transform);
//! // before the surface is destroyed, with the context still current:
//! renderer.release();
//! ```

pub mod config;
mod error;
pub mod geometry;
pub mod renderer;
pub mod shaders;

pub use camgray_core::{FrameInput, SurfaceSize};
pub use config::{RendererConfig, ZeroTexturePolicy};
pub use error::RenderError;
pub use renderer::FrameRenderer;
