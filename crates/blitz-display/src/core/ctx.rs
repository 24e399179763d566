use anyhow::Result;

use crate::backend::{GraphicsBackend, Renderer, UniformLocation};
use crate::coords::{Transform, ViewportFitter};
use crate::time::{FrameTime, LoopTimer};

use super::app::SessionCtl;

/// Per-frame context passed to [`FrameSource::next_frame`](crate::frames::FrameSource::next_frame).
///
/// `matrix` is the working model transform; the session resets it to identity
/// before every frame. The view transform comes from `viewport`.
pub struct FrameCtx<'a, B: GraphicsBackend + ?Sized> {
    pub backend:  &'a mut B,
    pub renderer: &'a mut dyn Renderer,
    pub matrix:   &'a mut Transform,
    pub viewport: &'a mut ViewportFitter,
    pub timer:    &'a mut LoopTimer,
    pub ctl:      &'a mut SessionCtl,
    pub time:     FrameTime,
}

impl<'a, B: GraphicsBackend + ?Sized> FrameCtx<'a, B> {
    /// Uploads `view * matrix` to `uniform`.
    pub fn commit_matrix(&mut self, uniform: UniformLocation) -> Result<()> {
        let m = *self.viewport.view_matrix() * *self.matrix;
        self.backend.uniform_matrix4(uniform, m.as_cols())
    }

    /// Refits the viewport for `aspect` (`None` = window aspect).
    pub fn set_aspect(&mut self, aspect: Option<f64>) {
        self.viewport.set_aspect(aspect);
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.viewport.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.viewport.height()
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.viewport.top()
    }

    #[inline]
    pub fn round_coord(&self, c: f32) -> f32 {
        self.viewport.round_coord(c)
    }

    /// Timing diagnostic, see [`LoopTimer::log`].
    pub fn log(&mut self, msg: &str) {
        self.timer.log(msg);
    }
}
