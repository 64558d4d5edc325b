//! Terminal render adapter.
//!
//! A small, game-oriented rendering layer: turn frames from the session are
//! animated by [`TileAnimator`], laid out by [`GameView`] into a
//! [`FrameBuffer`], and flushed by [`TerminalRenderer`] as full or diffed
//! redraws. No ratatui widgets or layout.
//!
//! Everything except [`TerminalRenderer`] is pure and unit-tested.

pub mod animation;
pub mod fb;
pub mod game_view;
pub mod render_throttle;
pub mod renderer;

pub use tui_2048_core as core;
pub use tui_2048_types as types;

pub use animation::{TileAnimator, TileSprite, DEFAULT_MS_PER_CELL};
pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{tile_color, AdapterStatusView, BoardScene, GameView, LabelMode, Viewport};
pub use render_throttle::RenderThrottle;
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
