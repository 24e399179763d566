//! Window + runtime loop.
//!
//! Owns the `winit` event loop and window, and feeds their events into a
//! [`DisplaySession`](crate::session::DisplaySession) backed by wgpu.

mod runtime;

pub use runtime::{Runtime, WgpuSession};
