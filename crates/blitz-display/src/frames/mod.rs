//! Frame sequencing.
//!
//! Rendering logic is supplied as a [`FrameSource`]: an object that draws one
//! frame per call and eventually reports [`Advance::EndOfSequence`]. The
//! [`FrameScheduler`] owns the current source and advances it once per loop
//! iteration.

mod scheduler;
mod source;

pub use scheduler::FrameScheduler;
pub use source::{from_fn, Advance, FrameSource, FromFn};
