//! Handles passed to frame steps running on the wgpu backend.

mod ctx;

pub(crate) use ctx::begin_pass;
pub use ctx::{RenderCtx, RenderTarget};
