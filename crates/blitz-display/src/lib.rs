//! Display substrate for the blitz karaoke front-end.
//!
//! This crate owns the letterboxing transform, the once-per-refresh render
//! loop and the window lifecycle. Actual drawing happens in frame sources
//! supplied by higher layers.

pub mod backend;
pub mod coords;
pub mod core;
pub mod device;
pub mod frames;
pub mod input;
pub mod logging;
pub mod render;
pub mod session;
pub mod time;
pub mod window;

#[cfg(test)]
mod testing;
