//! Coordinate spaces and the letterboxing transform.
//!
//! Three spaces are involved:
//! - physical window pixels (origin bottom-left, as GL reports them)
//! - the fitted viewport, centered inside the window
//! - logical space `[0, 1] × [0, top]`, one unit = fitted width
//!
//! [`ViewportFitter`] produces the transform from logical space to NDC.

mod color;
mod transform;
mod viewport;

pub use color::ColorRgba;
pub use transform::Transform;
pub use viewport::{AspectKey, Fit, ViewportFitter, WindowSize};
