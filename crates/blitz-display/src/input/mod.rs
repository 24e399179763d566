//! Platform-agnostic keyboard events.
//!
//! The runtime translates window-system events into these types before they
//! reach the session's keyboard handler.

mod types;

pub use types::{Key, KeyEvent, KeyState, Modifiers};
