use anyhow::Result;

use crate::backend::GraphicsBackend;
use crate::core::FrameCtx;

/// Outcome of pulling one step from a [`FrameSource`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Advance {
    /// A frame was drawn; keep looping.
    Frame,
    /// The sequence is exhausted. Not an error: the loop ends cleanly.
    EndOfSequence,
}

/// Forward-only producer of frames.
///
/// Each call draws exactly one frame through `ctx` and reports whether more
/// follow. State lives in the implementor; a finished source is never asked
/// again and cannot be rewound, install a fresh one instead.
pub trait FrameSource<B: GraphicsBackend + ?Sized> {
    fn next_frame(&mut self, ctx: &mut FrameCtx<'_, B>) -> Result<Advance>;
}

impl<B, S> FrameSource<B> for Box<S>
where
    B: GraphicsBackend + ?Sized,
    S: FrameSource<B> + ?Sized,
{
    fn next_frame(&mut self, ctx: &mut FrameCtx<'_, B>) -> Result<Advance> {
        (**self).next_frame(ctx)
    }
}

/// [`FrameSource`] backed by a closure. See [`from_fn`].
pub struct FromFn<F>(F);

/// Wraps a state-holding closure as a frame source.
///
/// ```
/// use blitz_display::backend::GraphicsBackend;
/// use blitz_display::frames::{from_fn, Advance, FrameSource};
///
/// fn countdown<B: GraphicsBackend + ?Sized>(mut left: u32) -> impl FrameSource<B> {
///     from_fn(move |_ctx| {
///         if left == 0 {
///             return Ok(Advance::EndOfSequence);
///         }
///         left -= 1;
///         Ok(Advance::Frame)
///     })
/// }
/// # let _ = countdown::<blitz_display::device::WgpuBackend>(3);
/// ```
pub fn from_fn<B, F>(f: F) -> FromFn<F>
where
    B: GraphicsBackend + ?Sized,
    F: FnMut(&mut FrameCtx<'_, B>) -> Result<Advance>,
{
    FromFn(f)
}

impl<B, F> FrameSource<B> for FromFn<F>
where
    B: GraphicsBackend + ?Sized,
    F: FnMut(&mut FrameCtx<'_, B>) -> Result<Advance>,
{
    fn next_frame(&mut self, ctx: &mut FrameCtx<'_, B>) -> Result<Advance> {
        (self.0)(ctx)
    }
}
