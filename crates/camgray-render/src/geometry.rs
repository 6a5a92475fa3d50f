//! Fullscreen quad submitted as client-side vertex arrays.
//!
//! Triangle-strip order: bottom-left, bottom-right, top-left, top-right.

/// Floats per vertex in both arrays.
pub const COMPONENTS: i32 = 2;
pub const VERTEX_COUNT: i32 = 4;

pub static QUAD_POSITIONS: [f32; 8] = [
    -1.0, -1.0, // bottom-left
    1.0, -1.0, // bottom-right
    -1.0, 1.0, // top-left
    1.0, 1.0, // top-right
];

/// V runs opposite to position Y, matching the camera's upload orientation.
pub static QUAD_TEX_COORDS: [f32; 8] = [
    0.0, 1.0, // bottom-left
    1.0, 1.0, // bottom-right
    0.0, 0.0, // top-left
    1.0, 0.0, // top-right
];
