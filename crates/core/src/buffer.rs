//! Move-result buffer - per-turn record of where every tile went
//!
//! The buffer overlays the grid while a slide is being resolved: reads go
//! through it first, so tiles that already moved this turn are seen at their
//! new position. Once the slide finishes the grid commits it, and the render
//! layer reads it to animate the turn.

use crate::tile::Tile;

/// Where a tile arriving at a cell came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileMove {
    /// Tile now occupying the destination
    pub tile: Tile,
    pub from_x: u8,
    pub from_y: u8,
    pub from_index: usize,
    /// Destination was produced by a merge this turn (it cannot merge again)
    pub merged: bool,
    /// Source of a tile that slid into the destination earlier this turn and
    /// was then merged into
    pub partner: Option<usize>,
}

/// State of one cell within the current turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Slot {
    /// Nothing happened here this turn
    #[default]
    Untouched,
    /// The tile that was here left this turn
    Vacated,
    /// A tile arrived here this turn
    Arrived(TileMove),
}

/// Sparse destination → source mapping for one turn
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MoveResultBuffer {
    slots: Vec<Slot>,
}

impl MoveResultBuffer {
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![Slot::Untouched; len],
        }
    }

    /// Clear every slot, keeping the allocation
    pub fn reset(&mut self, len: usize) {
        self.slots.clear();
        self.slots.resize(len, Slot::Untouched);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when no tile moved, merged, or vacated this turn
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| matches!(s, Slot::Untouched))
    }

    pub fn slot(&self, index: usize) -> Slot {
        self.slots.get(index).copied().unwrap_or_default()
    }

    /// The move that landed on `index`, if any
    pub fn arrival(&self, index: usize) -> Option<&TileMove> {
        match self.slots.get(index) {
            Some(Slot::Arrived(m)) => Some(m),
            _ => None,
        }
    }

    /// True when `index` already holds a merge result this turn
    pub fn is_resolved(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Slot::Arrived(m)) if m.merged)
    }

    pub(crate) fn arrive(&mut self, index: usize, mv: TileMove) {
        self.slots[index] = Slot::Arrived(mv);
    }

    pub(crate) fn vacate(&mut self, index: usize) {
        self.slots[index] = Slot::Vacated;
    }

    /// All arrivals as `(destination, move)` pairs, in index order
    pub fn moves(&self) -> impl Iterator<Item = (usize, &TileMove)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, s)| match s {
            Slot::Arrived(m) => Some((i, m)),
            _ => None,
        })
    }

    /// Indices whose tile left this turn and were not refilled
    pub fn vacated(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| matches!(s, Slot::Vacated).then_some(i))
    }

    /// Number of merges recorded this turn
    pub fn merge_count(&self) -> usize {
        self.moves().filter(|(_, m)| m.merged).count()
    }

    pub(crate) fn slots(&self) -> &[Slot] {
        &self.slots
    }
}
