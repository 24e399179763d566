//! Test doubles shared by the unit tests.

use anyhow::{bail, Result};

use crate::backend::{BlendFactor, ClearBuffers, GraphicsBackend, Renderer, UniformLocation};
use crate::coords::ColorRgba;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ActiveTexture(u32),
    BlendFunc(BlendFactor, BlendFactor),
    EnableBlend,
    ClearColor(ColorRgba),
    Clear(ClearBuffers),
    UniformMatrix4(UniformLocation, [f32; 16]),
    Swap,
}

/// Backend that records every call.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub calls: Vec<Call>,
    pub fail_swap: bool,
}

impl RecordingBackend {
    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn swaps(&self) -> usize {
        self.count(|c| *c == Call::Swap)
    }

    pub fn clears(&self) -> usize {
        self.count(|c| matches!(c, Call::Clear(_)))
    }

    pub fn uploads(&self) -> Vec<[f32; 16]> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::UniformMatrix4(_, m) => Some(*m),
                _ => None,
            })
            .collect()
    }
}

impl GraphicsBackend for RecordingBackend {
    fn active_texture(&mut self, unit: u32) -> Result<()> {
        self.calls.push(Call::ActiveTexture(unit));
        Ok(())
    }

    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) -> Result<()> {
        self.calls.push(Call::BlendFunc(src, dst));
        Ok(())
    }

    fn enable_blend(&mut self) -> Result<()> {
        self.calls.push(Call::EnableBlend);
        Ok(())
    }

    fn clear_color(&mut self, color: ColorRgba) -> Result<()> {
        self.calls.push(Call::ClearColor(color));
        Ok(())
    }

    fn clear(&mut self, buffers: ClearBuffers) -> Result<()> {
        self.calls.push(Call::Clear(buffers));
        Ok(())
    }

    fn uniform_matrix4(&mut self, location: UniformLocation, cols: &[f32; 16]) -> Result<()> {
        self.calls.push(Call::UniformMatrix4(location, *cols));
        Ok(())
    }

    fn swap_buffers(&mut self) -> Result<()> {
        if self.fail_swap {
            bail!("swap chain lost");
        }
        self.calls.push(Call::Swap);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct CountingRenderer {
    pub cleanups: u32,
}

impl Renderer for CountingRenderer {
    fn cleanup(&mut self) {
        self.cleanups += 1;
    }
}
