//! GLSL ES 1.00 sources for the grayscale pipeline.

use std::ffi::CStr;

/// Per-vertex position, pass-through, in normalized device coordinates.
pub const POSITION_ATTRIBUTE: &CStr = c"vPosition";
/// Per-vertex texture coordinate, before the capture transform.
pub const TEX_COORD_ATTRIBUTE: &CStr = c"vTexCoord";
/// Capture transform from the camera's `SurfaceTexture`.
pub const TRANSFORM_UNIFORM: &CStr = c"uTransformMatrix";

/// Rec. 601 luma weights applied to (R, G, B).
pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

pub const VERTEX_SHADER: &str = "\
attribute vec4 vPosition;
attribute vec2 vTexCoord;
varying vec2 yuvTexCoord;
uniform mat4 uTransformMatrix;
void main() {
  gl_Position = vPosition;
  yuvTexCoord = (uTransformMatrix * vec4(vTexCoord, 0.0, 1.0)).xy;
}
";

pub const FRAGMENT_SHADER_GRAYSCALE: &str = "\
#extension GL_OES_EGL_image_external : require
precision mediump float;
varying vec2 yuvTexCoord;
uniform samplerExternalOES sTexture;
void main() {
  vec3 color = texture2D(sTexture, yuvTexCoord).rgb;
  float gray = dot(color, vec3(0.299, 0.587, 0.114));
  gl_FragColor = vec4(gray, gray, gray, 1.0);
}
";

#[cfg(test)]
mod tests {
    use super::*;

    /// What the fragment shader writes for one 8-bit RGB sample, quantized
    /// back to 8 bits the way the framebuffer stores it.
    fn shaded(rgb: [u8; 3]) -> [u8; 4] {
        let color = glam::Vec3::from_array(rgb.map(|c| f32::from(c) / 255.0));
        let gray = color.dot(glam::Vec3::from_array(LUMA_WEIGHTS));
        let gray = (gray.clamp(0.0, 1.0) * 255.0).round() as u8;
        [gray, gray, gray, 255]
    }

    #[test]
    fn fragment_shader_uses_the_luma_weights() {
        let [r, g, b] = LUMA_WEIGHTS;
        assert!(FRAGMENT_SHADER_GRAYSCALE.contains(&format!("vec3({r}, {g}, {b})")));
        assert!(FRAGMENT_SHADER_GRAYSCALE.contains("gl_FragColor = vec4(gray, gray, gray, 1.0)"));
    }

    #[test]
    fn fragment_shader_samples_an_external_texture() {
        let extension = "#extension GL_OES_EGL_image_external : require";
        assert!(FRAGMENT_SHADER_GRAYSCALE.starts_with(extension));
        assert!(FRAGMENT_SHADER_GRAYSCALE.contains("uniform samplerExternalOES sTexture;"));
    }

    #[test]
    fn vertex_shader_declares_the_cached_names() {
        for name in [POSITION_ATTRIBUTE, TEX_COORD_ATTRIBUTE] {
            let name = name.to_str().unwrap();
            let suffix = format!(" {name};");
            assert!(VERTEX_SHADER
                .lines()
                .any(|line| line.starts_with("attribute ") && line.ends_with(&suffix)));
        }
        assert!(VERTEX_SHADER.contains("uniform mat4 uTransformMatrix;"));
    }

    #[test]
    fn luma_of_reference_colors() {
        assert_eq!(shaded([255, 0, 0]), [76, 76, 76, 255]);
        assert_eq!(shaded([255, 255, 255]), [255, 255, 255, 255]);
        assert_eq!(shaded([0, 0, 0]), [0, 0, 0, 255]);
        assert_eq!(shaded([0, 255, 0]), [150, 150, 150, 255]);
    }

    #[test]
    fn luma_weights_sum_to_one() {
        let sum: f32 = LUMA_WEIGHTS.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }
}
