use anyhow::Result;

use blitz_display::backend::{GraphicsBackend, UniformLocation};
use blitz_display::coords::ColorRgba;
use blitz_display::core::FrameCtx;
use blitz_display::frames::{Advance, FrameSource};

/// Slot the band matrix is committed to.
pub const BAND_UNIFORM: UniformLocation = UniformLocation(0);

/// Frame source that steps the clear color through a palette.
///
/// Runs forever unless a frame limit is set.
pub struct ColorCycle {
    palette: Vec<ColorRgba>,
    hold: u64,
    limit: Option<u64>,
    frame: u64,
}

impl ColorCycle {
    /// Shows each palette entry for `hold` frames.
    pub fn new(palette: Vec<ColorRgba>, hold: u64) -> Self {
        assert!(!palette.is_empty(), "palette must not be empty");
        Self {
            palette,
            hold: hold.max(1),
            limit: None,
            frame: 0,
        }
    }

    pub fn with_limit(mut self, frames: Option<u64>) -> Self {
        self.limit = frames;
        self
    }

    pub fn color_for(&self, frame: u64) -> ColorRgba {
        let idx = (frame / self.hold) as usize % self.palette.len();
        self.palette[idx]
    }
}

impl<B: GraphicsBackend + ?Sized> FrameSource<B> for ColorCycle {
    fn next_frame(&mut self, ctx: &mut FrameCtx<'_, B>) -> Result<Advance> {
        if self.limit.is_some_and(|limit| self.frame >= limit) {
            return Ok(Advance::EndOfSequence);
        }

        // Takes effect on the next clear.
        ctx.ctl.set_clear_color(self.color_for(self.frame + 1));

        // Centre the band vertically, snapped to whole pixels.
        let band = ctx.round_coord(ctx.top() / 2.0);
        ctx.matrix.translate(0.0, band, 0.0);
        ctx.commit_matrix(BAND_UNIFORM)?;

        if self.frame % 240 == 0 {
            let fps = ctx.time.fps.unwrap_or(0.0);
            ctx.log(&format!(
                "frame {} viewport {}x{} fps {fps:.1}",
                self.frame,
                ctx.width(),
                ctx.height()
            ));
        }

        self.frame += 1;
        Ok(Advance::Frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette() -> Vec<ColorRgba> {
        vec![
            ColorRgba::new(1.0, 0.0, 0.0, 1.0),
            ColorRgba::new(0.0, 1.0, 0.0, 1.0),
        ]
    }

    #[test]
    fn holds_each_color() {
        let c = ColorCycle::new(palette(), 3);
        assert_eq!(c.color_for(0), palette()[0]);
        assert_eq!(c.color_for(2), palette()[0]);
        assert_eq!(c.color_for(3), palette()[1]);
        assert_eq!(c.color_for(6), palette()[0]);
    }

    #[test]
    fn zero_hold_is_treated_as_one() {
        let c = ColorCycle::new(palette(), 0);
        assert_eq!(c.color_for(1), palette()[1]);
    }
}
