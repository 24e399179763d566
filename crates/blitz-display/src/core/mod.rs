//! Contracts between the render loop and the code it drives.
//!
//! Frame steps and input handlers never hold the session itself; they get a
//! [`FrameCtx`] or a [`SessionCtl`] scoped to the callback.

mod app;
mod ctx;

pub(crate) use app::Command;
pub use app::{LoopControl, SessionCtl};
pub use ctx::FrameCtx;
