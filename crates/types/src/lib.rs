//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are plain data with no game logic, making them usable in any
//! context (core logic, terminal rendering, remote protocol).
//!
//! # Grid
//!
//! The playfield is a square grid of `size * size` cells stored row-major:
//!
//! - **Default size**: 4 (the classic 4x4 board)
//! - **Accepted sizes**: 2 through 16
//! - **Coordinates**: (x, y) with x growing to the right and y growing downwards
//!
//! # Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_GRID_SIZE` | 4 | Board edge length |
//! | `DOUBLE_SPAWN_THRESHOLD` | 0.9 | A spawn draw above this yields power 2 |
//! | `DEFAULT_SEED` | `"0"` | Seed used when none is configured |
//! | `LEADERBOARD_KEY` | `"game.leaderscore"` | Key of the persisted best score |
//! | `SWIPE_MIN_DISTANCE` | 50.0 | Minimum swipe length before it counts as input |
//!
//! # Examples
//!
//! ```
//! use tui_2048_types::{Direction, GameAction, DEFAULT_GRID_SIZE};
//!
//! // Directions are axis-aligned unit vectors in screen coordinates.
//! assert_eq!(Direction::Up.vector(), (0, -1));
//! assert_eq!(Direction::from_vector(1, 0), Some(Direction::Right));
//! assert_eq!(Direction::from_vector(1, 1), None);
//!
//! // Parse a game action (case-insensitive).
//! let action = GameAction::from_str("LEFT").unwrap();
//! assert_eq!(action, GameAction::Move(Direction::Left));
//!
//! assert_eq!(DEFAULT_GRID_SIZE, 4);
//! ```

use serde::{Deserialize, Serialize};

/// Default board edge length (4x4 grid)
pub const DEFAULT_GRID_SIZE: usize = 4;

/// Smallest accepted board edge length
pub const MIN_GRID_SIZE: usize = 2;

/// Largest accepted board edge length (coordinates must fit in a `u8`)
pub const MAX_GRID_SIZE: usize = 16;

/// A spawn roll strictly above this value produces a power-2 tile instead of power 1
pub const DOUBLE_SPAWN_THRESHOLD: f64 = 0.9;

/// Seed used when nothing else is configured
pub const DEFAULT_SEED: &str = "0";

/// Key under which the best score is persisted
pub const LEADERBOARD_KEY: &str = "game.leaderscore";

/// Minimum swipe length along the dominant axis
pub const SWIPE_MIN_DISTANCE: f32 = 50.0;

/// Glyph titles for tile powers 1..=12
pub const TILE_TITLES: [&str; 12] = [
    " ∙",
    " ∙ ∙",
    " ∙ ∙ ∙",
    "◉",
    "◉◉",
    "◉◉◉",
    "✦",
    "✦✦",
    "✦✦✦",
    "★",
    "★★",
    "★★★",
];

/// Title shown for powers beyond [`TILE_TITLES`]
pub const FALLBACK_TILE_TITLE: &str = "◌";

/// Look up the glyph title for a tile power.
///
/// # Examples
///
/// ```
/// use tui_2048_types::{tile_title, FALLBACK_TILE_TITLE};
///
/// assert_eq!(tile_title(4), "◉");
/// assert_eq!(tile_title(0), FALLBACK_TILE_TITLE);
/// assert_eq!(tile_title(13), FALLBACK_TILE_TITLE);
/// ```
pub fn tile_title(power: u8) -> &'static str {
    if power == 0 {
        return FALLBACK_TILE_TITLE;
    }
    TILE_TITLES
        .get(power as usize - 1)
        .copied()
        .unwrap_or(FALLBACK_TILE_TITLE)
}

/// The four slide directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// All directions, in the order game-over detection probes them.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Unit vector `(dx, dy)` in screen coordinates
    pub fn vector(self) -> (i8, i8) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }

    /// Map a raw input vector to a direction.
    ///
    /// Only the four axis-aligned unit vectors are accepted; zero and
    /// diagonal vectors return `None`.
    pub fn from_vector(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            _ => None,
        }
    }

    /// The direction pointing the other way
    pub fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// True for `Left`/`Right`
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Parse direction from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_2048_types::Direction;
    ///
    /// assert_eq!(Direction::from_str("up"), Some(Direction::Up));
    /// assert_eq!(Direction::from_str("Down"), Some(Direction::Down));
    /// assert_eq!(Direction::from_str("sideways"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            _ => None,
        }
    }

    /// Lowercase string representation
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

/// Player-facing actions accepted by the session driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameAction {
    Move(Direction),
    Restart,
}

impl GameAction {
    /// Parse an action from string (case-insensitive)
    ///
    /// Accepts the four direction names and `restart`.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("restart") {
            return Some(GameAction::Restart);
        }
        Direction::from_str(s).map(GameAction::Move)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameAction::Move(direction) => direction.as_str(),
            GameAction::Restart => "restart",
        }
    }
}

/// Lifecycle phase of a game session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Accepting turns
    #[default]
    Active,
    /// Terminal: the grid is full and no direction moves anything
    GameOver,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_vectors_round_trip() {
        for dir in Direction::ALL {
            let (dx, dy) = dir.vector();
            assert_eq!(Direction::from_vector(dx as i32, dy as i32), Some(dir));
        }
    }

    #[test]
    fn zero_and_diagonal_vectors_are_rejected() {
        assert_eq!(Direction::from_vector(0, 0), None);
        assert_eq!(Direction::from_vector(1, 1), None);
        assert_eq!(Direction::from_vector(-1, 1), None);
        assert_eq!(Direction::from_vector(2, 0), None);
    }

    #[test]
    fn opposite_is_involution() {
        for dir in Direction::ALL {
            assert_ne!(dir.opposite(), dir);
            assert_eq!(dir.opposite().opposite(), dir);
        }
        assert!(Direction::Left.is_horizontal());
        assert!(!Direction::Down.is_horizontal());
    }

    #[test]
    fn game_action_parsing() {
        assert_eq!(
            GameAction::from_str("Right"),
            Some(GameAction::Move(Direction::Right))
        );
        assert_eq!(GameAction::from_str("RESTART"), Some(GameAction::Restart));
        assert_eq!(GameAction::from_str("hold"), None);
        assert_eq!(GameAction::Move(Direction::Up).as_str(), "up");
    }

    #[test]
    fn tile_titles_cover_first_twelve_powers() {
        assert_eq!(tile_title(1), " ∙");
        assert_eq!(tile_title(12), "★★★");
        assert_eq!(tile_title(200), FALLBACK_TILE_TITLE);
    }

    #[test]
    fn new_sessions_start_active() {
        assert_eq!(GamePhase::default(), GamePhase::Active);
    }
}
