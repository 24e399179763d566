//! wgpu device, surface and the [`WgpuBackend`] built on them.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the window surface and depth buffer
//! - turning the session's backend calls into wgpu commands

mod backend;
mod error;
mod gpu;
mod init;

pub use backend::WgpuBackend;
pub use error::SurfaceErrorAction;
pub use gpu::{Gpu, GpuFrame};
pub use init::GpuInit;
