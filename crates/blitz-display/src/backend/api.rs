use anyhow::Result;

use crate::coords::ColorRgba;

/// Blend factor for [`GraphicsBackend::blend_func`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
}

/// Buffers affected by [`GraphicsBackend::clear`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ClearBuffers {
    pub color: bool,
    pub depth: bool,
}

impl ClearBuffers {
    pub const COLOR_DEPTH: Self = Self { color: true, depth: true };
}

/// Opaque uniform slot handed out by the shader layer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct UniformLocation(pub u32);

/// Capability surface the display session needs from a graphics API.
///
/// Implementations are free to defer work (record commands, batch uploads)
/// as long as everything issued between two [`swap_buffers`](Self::swap_buffers)
/// calls lands in the same presented frame.
pub trait GraphicsBackend {
    /// Selects the texture unit subsequent texture binds apply to.
    fn active_texture(&mut self, unit: u32) -> Result<()>;

    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) -> Result<()>;

    fn enable_blend(&mut self) -> Result<()>;

    /// Sets the color used by the next [`clear`](Self::clear).
    fn clear_color(&mut self, color: ColorRgba) -> Result<()>;

    fn clear(&mut self, buffers: ClearBuffers) -> Result<()>;

    /// Uploads a 4x4 matrix given in column-major order.
    fn uniform_matrix4(&mut self, location: UniformLocation, cols: &[f32; 16]) -> Result<()>;

    /// Presents the frame.
    fn swap_buffers(&mut self) -> Result<()>;
}

/// Drawing layer that owns per-frame transient resources.
pub trait Renderer {
    /// Frees whatever the last frame step allocated. Called once per frame.
    fn cleanup(&mut self);
}

/// Renderer with nothing to clean up.
#[derive(Debug, Default, Copy, Clone)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn cleanup(&mut self) {}
}
