//! Session engine - drives a game for a shell (terminal, network, headless)
//!
//! - [`session`]: [`Session`] owns the game, the leaderboard and the render sinks
//! - [`replay`]: [`Recorder`] / [`Replay`] for reproducible move histories

pub mod replay;
pub mod session;

pub use replay::{Recorder, Replay};
pub use session::Session;
