//! Backend seam.
//!
//! The session never talks to a graphics API directly; it drives a
//! [`GraphicsBackend`] and a [`Renderer`] injected at construction.
//! `device::WgpuBackend` is the shipped implementation.

mod api;

pub use api::{BlendFactor, ClearBuffers, GraphicsBackend, NullRenderer, Renderer, UniformLocation};
