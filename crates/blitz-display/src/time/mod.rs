//! Frame timing.
//!
//! - [`FrameClock`]: one per render loop, ticked once per iteration
//! - [`LoopTimer`]: `[ms ms] message` diagnostics within an iteration

mod frame_clock;
mod loop_timer;

pub use frame_clock::{FrameClock, FrameTime};
pub use loop_timer::LoopTimer;
