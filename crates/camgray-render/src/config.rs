//! Renderer options.

/// What to do when a frame arrives with texture name 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroTexturePolicy {
    /// Skip the frame without touching GL state.
    #[default]
    Skip,
    /// Draw anyway. Sampling texture 0 on the external target is undefined
    /// on most drivers.
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RendererConfig {
    pub zero_texture: ZeroTexturePolicy,
    /// Drain and log `glGetError` after every frame.
    pub check_errors: bool,
}

impl RendererConfig {
    pub fn with_zero_texture(mut self, policy: ZeroTexturePolicy) -> Self {
        self.zero_texture = policy;
        self
    }

    pub fn with_check_errors(mut self, check: bool) -> Self {
        self.check_errors = check;
        self
    }
}
