//! Tile module - one occupied grid cell

use serde::{Deserialize, Serialize};

use crate::types::tile_title;

/// A power-of-two tile stamped with the turn it was created on.
///
/// Tiles are values: a merge never bumps a tile's power in place, it
/// produces a new tile via [`Tile::merged`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    power: u8,
    turn: u32,
}

impl Tile {
    /// A fresh power-1 tile (value 2)
    pub fn new(turn: u32) -> Self {
        Self { power: 1, turn }
    }

    /// A tile with an explicit power (clamped to at least 1)
    pub fn with_power(turn: u32, power: u8) -> Self {
        Self {
            power: power.max(1),
            turn,
        }
    }

    pub fn power(&self) -> u8 {
        self.power
    }

    /// Turn on which this tile was spawned or produced by a merge
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Displayed value, `2^power` (saturating)
    pub fn value(&self) -> u64 {
        1u64.checked_shl(self.power as u32).unwrap_or(u64::MAX)
    }

    /// Points contributed when this tile is new on the current turn
    pub fn score(&self) -> u64 {
        self.value()
    }

    pub fn title(&self) -> &'static str {
        tile_title(self.power)
    }

    /// Result of merging two tiles of this power on `turn`
    pub fn merged(&self, turn: u32) -> Self {
        Self {
            power: self.power.saturating_add(1),
            turn,
        }
    }
}
