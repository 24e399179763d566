use std::collections::HashMap;

use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;

use crate::backend::{BlendFactor, ClearBuffers, GraphicsBackend, UniformLocation};
use crate::coords::ColorRgba;
use crate::render::{begin_pass, RenderCtx, RenderTarget};

use super::{Gpu, GpuFrame, SurfaceErrorAction};

/// Size of one `mat4x4<f32>` uniform.
const MAT4_BYTES: u64 = 16 * 4;

/// [`GraphicsBackend`] on top of [`Gpu`].
///
/// A surface texture is acquired lazily by the first clear of a frame and
/// presented by `swap_buffers`. The blend state set through the trait is
/// recorded and exposed to frame steps through
/// [`frame`](Self::frame), since wgpu bakes it into pipelines. Matrix uniforms
/// get one buffer per location, see [`uniform_buffer`](Self::uniform_buffer).
pub struct WgpuBackend {
    gpu: Gpu,
    frame: Option<GpuFrame>,

    clear_color: ColorRgba,
    blend: wgpu::BlendState,
    blend_enabled: bool,

    uniforms: HashMap<UniformLocation, wgpu::Buffer>,
    skipped_frames: u64,
}

impl WgpuBackend {
    pub fn new(gpu: Gpu) -> Self {
        Self {
            gpu,
            frame: None,
            clear_color: ColorRgba::BLACK,
            blend: wgpu::BlendState::REPLACE,
            blend_enabled: false,
            uniforms: HashMap::new(),
            skipped_frames: 0,
        }
    }

    #[inline]
    pub fn gpu(&self) -> &Gpu {
        &self.gpu
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.gpu.resize(size);
    }

    /// Blend state to bake into pipelines, `None` while blending is disabled.
    pub fn blend_state(&self) -> Option<wgpu::BlendState> {
        self.blend_enabled.then_some(self.blend)
    }

    /// Uniform buffer holding the matrix last uploaded to `location`.
    pub fn uniform_buffer(&self, location: UniformLocation) -> Option<&wgpu::Buffer> {
        self.uniforms.get(&location)
    }

    /// Frames dropped because the surface was unavailable.
    #[inline]
    pub fn skipped_frames(&self) -> u64 {
        self.skipped_frames
    }

    /// Handles for recording into the current frame.
    ///
    /// `None` when no frame is in flight (nothing cleared yet, or the surface
    /// was unavailable this iteration).
    pub fn frame(&mut self) -> Option<(RenderCtx<'_>, RenderTarget<'_>)> {
        let blend = self.blend_state();
        let frame = self.frame.as_mut()?;

        let ctx = RenderCtx {
            device: self.gpu.device(),
            queue: self.gpu.queue(),
            surface_format: self.gpu.surface_format(),
            blend,
            size: self.gpu.size(),
        };
        let target = RenderTarget {
            encoder: &mut frame.encoder,
            color_view: &frame.view,
            depth_view: self.gpu.depth_view(),
        };
        Some((ctx, target))
    }

    /// Makes sure a surface texture is acquired. `Ok(false)` means this frame
    /// is skipped.
    fn ensure_frame(&mut self) -> Result<bool> {
        if self.frame.is_some() {
            return Ok(true);
        }

        match self.gpu.begin_frame() {
            Ok(frame) => {
                self.frame = Some(frame);
                Ok(true)
            }
            Err(err) => match self.gpu.handle_surface_error(&err) {
                SurfaceErrorAction::Fatal => {
                    Err(err).context("failed to acquire surface texture")
                }
                action => {
                    log::warn!("skipping frame: {err} ({action:?})");
                    self.skipped_frames += 1;
                    Ok(false)
                }
            },
        }
    }
}

impl GraphicsBackend for WgpuBackend {
    fn active_texture(&mut self, unit: u32) -> Result<()> {
        let max = self.gpu.device().limits().max_sampled_textures_per_shader_stage;
        // Bindings are per pipeline in wgpu; only the range is checked.
        anyhow::ensure!(unit < max, "texture unit {unit} out of range (max {max})");
        Ok(())
    }

    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) -> Result<()> {
        let component = wgpu::BlendComponent {
            src_factor: map_blend_factor(src),
            dst_factor: map_blend_factor(dst),
            operation: wgpu::BlendOperation::Add,
        };
        self.blend = wgpu::BlendState {
            color: component,
            alpha: component,
        };
        Ok(())
    }

    fn enable_blend(&mut self) -> Result<()> {
        self.blend_enabled = true;
        Ok(())
    }

    fn clear_color(&mut self, color: ColorRgba) -> Result<()> {
        self.clear_color = color;
        Ok(())
    }

    fn clear(&mut self, buffers: ClearBuffers) -> Result<()> {
        if !self.ensure_frame()? {
            return Ok(());
        }
        let Some(frame) = self.frame.as_mut() else {
            return Ok(());
        };

        let color_load = if buffers.color {
            let c = self.clear_color;
            wgpu::LoadOp::Clear(wgpu::Color {
                r: c.r as f64,
                g: c.g as f64,
                b: c.b as f64,
                a: c.a as f64,
            })
        } else {
            wgpu::LoadOp::Load
        };
        let depth_load = if buffers.depth {
            wgpu::LoadOp::Clear(1.0)
        } else {
            wgpu::LoadOp::Load
        };
        let depth = self.gpu.depth_view().map(|v| (v, depth_load));

        // Dropping the pass right away records the clear.
        let _pass = begin_pass(&mut frame.encoder, "blitz clear", &frame.view, color_load, depth);
        Ok(())
    }

    fn uniform_matrix4(&mut self, location: UniformLocation, cols: &[f32; 16]) -> Result<()> {
        let device = self.gpu.device();
        let buffer = self.uniforms.entry(location).or_insert_with(|| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("blitz matrix uniform"),
                size: MAT4_BYTES,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });
        self.gpu
            .queue()
            .write_buffer(buffer, 0, bytemuck::cast_slice(&cols[..]));
        Ok(())
    }

    fn swap_buffers(&mut self) -> Result<()> {
        if let Some(frame) = self.frame.take() {
            self.gpu.submit(frame);
        }
        Ok(())
    }
}

fn map_blend_factor(f: BlendFactor) -> wgpu::BlendFactor {
    match f {
        BlendFactor::Zero => wgpu::BlendFactor::Zero,
        BlendFactor::One => wgpu::BlendFactor::One,
        BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
        BlendFactor::DstAlpha => wgpu::BlendFactor::DstAlpha,
        BlendFactor::OneMinusDstAlpha => wgpu::BlendFactor::OneMinusDstAlpha,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premultiplied_blend_maps_to_wgpu_factors() {
        assert_eq!(map_blend_factor(BlendFactor::One), wgpu::BlendFactor::One);
        assert_eq!(
            map_blend_factor(BlendFactor::OneMinusSrcAlpha),
            wgpu::BlendFactor::OneMinusSrcAlpha
        );
    }

    #[test]
    fn matrix_uniform_size_matches_column_array() {
        let cols = [0.0f32; 16];
        assert_eq!(bytemuck::cast_slice::<f32, u8>(&cols).len() as u64, MAT4_BYTES);
    }
}
