//! Display session: viewport, frame scheduling and window lifecycle in one
//! single-threaded state machine.

mod config;
mod display;

pub use config::SessionConfig;
pub use display::{DisplaySession, Lifecycle};
