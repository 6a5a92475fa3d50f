//! Host-facing types for the camgray camera renderer.
//!
//! The host render loop owns the surface and the camera stream. This crate
//! only describes what it hands over each lifecycle event: surface sizes and
//! per-frame [`FrameInput`]s. It also installs the process-wide
//! [`tracing`] subscriber via [`logging::init`].

pub mod inputs;
pub mod logging;

pub use inputs::{FrameInput, InputError, SurfaceSize, IDENTITY_TRANSFORM};
