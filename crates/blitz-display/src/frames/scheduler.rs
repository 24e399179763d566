use anyhow::Result;

use crate::backend::GraphicsBackend;
use crate::core::FrameCtx;

use super::source::{Advance, FrameSource};

/// Drives the installed [`FrameSource`] one step per loop iteration.
pub struct FrameScheduler<B: GraphicsBackend + ?Sized> {
    source: Option<Box<dyn FrameSource<B>>>,
    advanced: u64,
}

impl<B: GraphicsBackend + ?Sized> FrameScheduler<B> {
    pub fn new() -> Self {
        Self {
            source: None,
            advanced: 0,
        }
    }

    /// Installs `source`, dropping the previous one and whatever state it held.
    pub fn set_source(&mut self, source: Box<dyn FrameSource<B>>) {
        if self.source.is_some() {
            log::debug!("frame source replaced after {} frames", self.advanced);
        }
        self.source = Some(source);
        self.advanced = 0;
    }

    /// Whether a source is installed and not yet exhausted.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.source.is_some()
    }

    /// Frames produced by the current source.
    #[inline]
    pub fn frames_advanced(&self) -> u64 {
        self.advanced
    }

    /// Pulls exactly one step from the source.
    ///
    /// Returns [`Advance::EndOfSequence`] once the source is exhausted (the
    /// source is dropped at that point) or when none is installed. Errors from
    /// the source are returned unchanged; the source stays installed.
    pub fn advance(&mut self, ctx: &mut FrameCtx<'_, B>) -> Result<Advance> {
        let Some(source) = self.source.as_mut() else {
            return Ok(Advance::EndOfSequence);
        };

        match source.next_frame(ctx)? {
            Advance::Frame => {
                self.advanced += 1;
                Ok(Advance::Frame)
            }
            Advance::EndOfSequence => {
                log::debug!("frame source finished after {} frames", self.advanced);
                self.source = None;
                Ok(Advance::EndOfSequence)
            }
        }
    }
}

impl<B: GraphicsBackend + ?Sized> Default for FrameScheduler<B> {
    fn default() -> Self {
        Self::new()
    }
}
