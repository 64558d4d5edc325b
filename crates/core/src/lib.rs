//! Core game logic - pure, deterministic, and testable
//!
//! Everything needed to play 2048 without a terminal, network or file
//! system: the grid and its slide/merge algorithm, the seeded PRNG, scoring,
//! the turn lifecycle, the render contract, and the best-score bookkeeping.
//!
//! # Module Structure
//!
//! - [`board`]: square grid, pull-based slide resolution, tile spawning
//! - [`buffer`]: per-turn move overlay recording where every tile came from
//! - [`game_state`]: the session lifecycle (`init` / `run` / `step`) and scoring
//! - [`rng`]: Alea PRNG, bit-compatible with the reference generator
//! - [`snapshot`]: render frames and restorable game snapshots
//! - [`events`]: events sent to render adapters
//! - [`leaderboard`]: best-score tracking over an injected key/value store
//! - [`config`]: typed configuration and its key/value parser
//!
//! # Game Rules
//!
//! - A slide moves every tile as far as it can towards one edge
//! - Two tiles of equal power merge into one of the next power, at most once per turn
//! - Every turn that changes the board spawns a tile (2, or 4 with probability 0.1)
//! - The score grows by the value of every tile created in the turn
//! - The game ends when a slide fails and no slide could succeed
//!
//! # Example
//!
//! ```
//! use tui_2048_core::{Game, GameConfig, TurnOutcome};
//! use tui_2048_core::types::Direction;
//!
//! let mut game = Game::new(&GameConfig::default()).unwrap();
//! game.run();
//!
//! let report = game.step(Direction::Left);
//! assert_eq!(report.outcome, TurnOutcome::Moved);
//! assert_eq!(game.grid().occupied_count(), 2);
//! ```
//!
//! Same seed, same moves, same game: the PRNG is the only source of chance.

pub mod board;
pub mod buffer;
pub mod config;
pub mod error;
pub mod events;
pub mod game_state;
pub mod leaderboard;
pub mod rng;
pub mod snapshot;
pub mod tile;

pub use tui_2048_types as types;

pub use board::{Cell, Grid, MoveCode};
pub use buffer::{MoveResultBuffer, Slot, TileMove};
pub use config::GameConfig;
pub use error::{ConfigError, StoreError};
pub use events::{EventLog, GameEvent, RenderSink};
pub use game_state::{Game, TurnOutcome, TurnReport};
pub use leaderboard::{Leaderboard, MemoryScoreStore, ScoreStore};
pub use rng::{Alea, AleaState};
pub use snapshot::{FrameTile, GameSnapshot, TurnFrame};
pub use tile::Tile;
