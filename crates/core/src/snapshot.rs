//! Snapshots handed to render adapters and persistence
//!
//! [`TurnFrame`] is the immutable per-turn picture the render contract
//! promises; [`GameSnapshot`] is the full restorable state.

use serde::{Deserialize, Serialize};

use crate::board::Grid;
use crate::buffer::MoveResultBuffer;
use crate::rng::AleaState;
use crate::tile::Tile;
use crate::types::{tile_title, GamePhase};

/// One tile as the render layer should show it after a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameTile {
    pub x: u8,
    pub y: u8,
    pub index: usize,
    pub power: u8,
    /// Where the tile was before this turn; None for a tile spawned this turn
    pub from: Option<(u8, u8)>,
    /// Produced by a merge this turn
    pub merged: bool,
    /// Spawned this turn
    pub spawned: bool,
    /// Second half of a merge that had already slid this turn
    pub partner_from: Option<(u8, u8)>,
}

impl FrameTile {
    pub fn value(&self) -> u64 {
        Tile::with_power(0, self.power).value()
    }

    pub fn title(&self) -> &'static str {
        tile_title(self.power)
    }

    /// Largest axis distance travelled this turn (0 for static or spawned tiles)
    pub fn distance(&self) -> u8 {
        let travelled = |(fx, fy): (u8, u8)| fx.abs_diff(self.x).max(fy.abs_diff(self.y));
        let main = self.from.map_or(0, travelled);
        let partner = self.partner_from.map_or(0, travelled);
        main.max(partner)
    }

    pub fn is_static(&self) -> bool {
        !self.spawned && !self.merged && self.from == Some((self.x, self.y))
    }
}

/// Everything the render adapter receives after a committed turn
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnFrame {
    pub turn: u32,
    pub score: u64,
    /// False for the opening frame and restarts
    pub animate: bool,
    pub grid_size: usize,
    pub tiles: Vec<FrameTile>,
    /// Cells emptied this turn
    pub vacated: Vec<usize>,
}

impl TurnFrame {
    /// Build a frame from the committed grid and the buffer that produced it
    pub fn build(grid: &Grid, buffer: &MoveResultBuffer, turn: u32, score: u64, animate: bool) -> Self {
        let coords = |index: usize| {
            let (x, y) = grid.coords(index);
            (x as u8, y as u8)
        };

        let tiles = grid
            .cells()
            .iter()
            .enumerate()
            .filter_map(|(index, cell)| {
                let tile = (*cell)?;
                let (x, y) = coords(index);
                let arrival = buffer.arrival(index);
                let spawned = arrival.is_none() && tile.turn() == turn;
                let from = match arrival {
                    Some(m) => Some((m.from_x, m.from_y)),
                    None if spawned => None,
                    None => Some((x, y)),
                };
                Some(FrameTile {
                    x,
                    y,
                    index,
                    power: tile.power(),
                    from,
                    merged: arrival.is_some_and(|m| m.merged),
                    spawned,
                    partner_from: arrival.and_then(|m| m.partner).map(coords),
                })
            })
            .collect();

        Self {
            turn,
            score,
            animate,
            grid_size: grid.size(),
            tiles,
            vacated: buffer
                .vacated()
                .filter(|&i| grid.tile(i).is_none())
                .collect(),
        }
    }

    pub fn tile_at(&self, x: u8, y: u8) -> Option<&FrameTile> {
        self.tiles.iter().find(|t| t.x == x && t.y == y)
    }

    pub fn spawned(&self) -> impl Iterator<Item = &FrameTile> {
        self.tiles.iter().filter(|t| t.spawned)
    }

    /// Longest distance any tile travelled
    pub fn max_distance(&self) -> u8 {
        self.tiles.iter().map(FrameTile::distance).max().unwrap_or(0)
    }
}

/// Complete restorable game state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub grid_size: usize,
    pub turn: u32,
    pub score: u64,
    pub phase: GamePhase,
    pub cells: Vec<Option<Tile>>,
    pub rng: AleaState,
}

impl GameSnapshot {
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn playable(&self) -> bool {
        self.phase == GamePhase::Active
    }
}
