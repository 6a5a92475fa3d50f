//! Inputs from the host render loop

use thiserror::Error;

/// Column-major 4x4 identity matrix.
pub const IDENTITY_TRANSFORM: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("surface size must be positive, got {width}x{height}")]
    InvalidSurface { width: i32, height: i32 },
    #[error("transform matrix must hold 16 floats, got {0}")]
    TransformLength(usize),
}

/// Surface dimensions in device pixels. Both sides are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    width: i32,
    height: i32,
}

impl SurfaceSize {
    pub fn new(width: i32, height: i32) -> Result<Self, InputError> {
        if width <= 0 || height <= 0 {
            return Err(InputError::InvalidSurface { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }
}

/// One frame's worth of camera data, borrowed from the capture pipeline.
///
/// `texture` names an external (OES) texture owned by the host; it is only
/// valid for the duration of the draw call. `transform` is the capture
/// transform in column-major order and is copied to the GPU, never kept.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub texture: u32,
    pub transform: &'a [f32; 16],
}

impl<'a> FrameInput<'a> {
    pub fn new(texture: u32, transform: &'a [f32; 16]) -> Self {
        Self { texture, transform }
    }

    /// Build from a flat float slice, as delivered by managed-code hosts.
    pub fn from_slice(texture: u32, transform: &'a [f32]) -> Result<Self, InputError> {
        let transform: &[f32; 16] = transform
            .try_into()
            .map_err(|_| InputError::TransformLength(transform.len()))?;
        Ok(Self { texture, transform })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_size_rejects_non_positive_sides() {
        assert_eq!(
            SurfaceSize::new(0, 0),
            Err(InputError::InvalidSurface {
                width: 0,
                height: 0
            })
        );
        assert!(SurfaceSize::new(-1, 720).is_err());
        assert!(SurfaceSize::new(1280, -720).is_err());

        let size = SurfaceSize::new(1280, 720).unwrap();
        assert_eq!((size.width(), size.height()), (1280, 720));
    }

    #[test]
    fn frame_input_from_slice_checks_length() {
        let short = [0.0f32; 9];
        assert_eq!(
            FrameInput::from_slice(3, &short).unwrap_err(),
            InputError::TransformLength(9)
        );

        let input = FrameInput::from_slice(3, &IDENTITY_TRANSFORM[..]).unwrap();
        assert_eq!(input.texture, 3);
        assert_eq!(input.transform, &IDENTITY_TRANSFORM);
    }
}
