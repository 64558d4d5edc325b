//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key events and mouse drags into
//! [`crate::types::GameAction`]s. Nothing here knows about the game state.

pub mod gesture;
pub mod map;

pub use tui_2048_types as types;

pub use gesture::{handle_mouse_event, SwipeTracker};
pub use map::{handle_key_event, should_quit};
