//! Board module - the tile grid and the slide/merge algorithm
//!
//! The grid is a square of `size * size` cells stored in a flat vector,
//! row-major (`y * size + x`). Each cell holds at most one [`Tile`].
//!
//! A slide is resolved by pulling: every cell, starting from the edge the
//! tiles move towards, scans the cells behind it and pulls the nearest tile
//! forward, merging with it when powers match. Reads and writes go through a
//! [`MoveResultBuffer`], so the grid itself is only touched by [`Grid::commit`].

use arrayvec::ArrayVec;

use crate::buffer::{MoveResultBuffer, Slot, TileMove};
use crate::error::ConfigError;
use crate::rng::Alea;
use crate::tile::Tile;
use crate::types::{Direction, DOUBLE_SPAWN_THRESHOLD, MAX_GRID_SIZE, MIN_GRID_SIZE};

/// A grid cell: empty or holding a tile
pub type Cell = Option<Tile>;

/// Result of trying to pull one tile into a destination cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MoveCode {
    /// Source cell is empty; keep scanning
    NoTarget,
    /// Source tile slid into the empty destination; keep scanning
    Moved,
    /// Destination holds a tile of another power (or an earlier merge); stop
    Blocked,
    /// Source tile merged into the destination; stop
    Merged,
}

impl MoveCode {
    /// Whether the board changed
    pub fn changed(self) -> bool {
        matches!(self, MoveCode::Moved | MoveCode::Merged)
    }

    /// Whether the destination scan for this cell is finished
    fn stops(self) -> bool {
        self >= MoveCode::Blocked
    }
}

/// Square tile grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an empty grid with edge length `size`
    pub fn new(size: usize) -> Result<Self, ConfigError> {
        Self::check_size(size)?;
        Ok(Self {
            size,
            cells: vec![None; size * size],
        })
    }

    /// Create a grid from row-major cells
    pub fn from_cells(size: usize, cells: Vec<Cell>) -> Result<Self, ConfigError> {
        Self::check_size(size)?;
        if cells.len() != size * size {
            return Err(ConfigError::CellCountMismatch {
                expected: size * size,
                actual: cells.len(),
            });
        }
        let zero = cells.iter().enumerate().find_map(|(index, cell)| {
            cell.filter(|t| t.power() == 0).map(|t| (index, t.power()))
        });
        if let Some((index, power)) = zero {
            return Err(ConfigError::InvalidTile { index, power });
        }
        Ok(Self { size, cells })
    }

    /// Create a grid from row-major powers (0 = empty), tiles stamped turn 0
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_2048_core::Grid;
    ///
    /// let grid = Grid::from_powers(2, &[1, 0, 0, 2]).unwrap();
    /// assert_eq!(grid.occupied_count(), 2);
    /// assert_eq!(grid.get(1, 1).flatten().map(|t| t.value()), Some(4));
    /// ```
    pub fn from_powers(size: usize, powers: &[u8]) -> Result<Self, ConfigError> {
        let cells = powers
            .iter()
            .map(|&p| (p > 0).then(|| Tile::with_power(0, p)))
            .collect();
        Self::from_cells(size, cells)
    }

    fn check_size(size: usize) -> Result<(), ConfigError> {
        if (MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&size) {
            Ok(())
        } else {
            Err(ConfigError::InvalidGridSize(size))
        }
    }

    /// Edge length
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of cells (`size * size`)
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when no cell holds a tile
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Flat index of `(x, y)`, or None when out of bounds
    #[inline(always)]
    pub fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x >= self.size || y >= self.size {
            return None;
        }
        Some(y * self.size + x)
    }

    /// `(x, y)` of a flat index
    #[inline(always)]
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index % self.size, index / self.size)
    }

    /// Cell at `(x, y)`; None if out of bounds
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Tile at a flat index
    pub fn tile(&self, index: usize) -> Cell {
        self.cells.get(index).copied().flatten()
    }

    /// Set the cell at `(x, y)`; returns false if out of bounds
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    /// Empty every cell
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn has_empty(&self) -> bool {
        self.cells.iter().any(Option::is_none)
    }

    /// Row-major powers with 0 for empty cells
    pub fn powers(&self) -> Vec<u8> {
        self.cells
            .iter()
            .map(|c| c.map_or(0, |t| t.power()))
            .collect()
    }

    /// Powers as rows, for display and tests
    pub fn rows(&self) -> Vec<Vec<u8>> {
        self.powers()
            .chunks(self.size)
            .map(|row| row.to_vec())
            .collect()
    }

    /// Highest tile power on the grid (0 when empty)
    pub fn max_power(&self) -> u8 {
        self.cells
            .iter()
            .flatten()
            .map(Tile::power)
            .max()
            .unwrap_or(0)
    }

    /// Tile at `index` as seen through this turn's buffer
    #[inline]
    fn peek(&self, index: usize, buffer: &MoveResultBuffer) -> Cell {
        match buffer.slot(index) {
            Slot::Untouched => self.tile(index),
            Slot::Vacated => None,
            Slot::Arrived(m) => Some(m.tile),
        }
    }

    /// Try to pull the tile at `from` into `to`, recording the result
    fn move_tile(
        &self,
        from: usize,
        to: usize,
        turn: u32,
        buffer: &mut MoveResultBuffer,
    ) -> MoveCode {
        let Some(source) = self.peek(from, buffer) else {
            return MoveCode::NoTarget;
        };

        let (from_x, from_y) = self.coords(from);
        let mut mv = TileMove {
            tile: source,
            from_x: from_x as u8,
            from_y: from_y as u8,
            from_index: from,
            merged: false,
            partner: None,
        };

        match self.peek(to, buffer) {
            None => {
                buffer.arrive(to, mv);
                buffer.vacate(from);
                MoveCode::Moved
            }
            // A merge result is final for this turn.
            Some(_) if buffer.is_resolved(to) => MoveCode::Blocked,
            Some(dest) if dest.power() == source.power() => {
                mv.tile = dest.merged(turn);
                mv.merged = true;
                mv.partner = buffer.arrival(to).map(|m| m.from_index);
                buffer.arrive(to, mv);
                buffer.vacate(from);
                MoveCode::Merged
            }
            Some(_) => MoveCode::Blocked,
        }
    }

    /// Resolve a full slide in `direction` into `buffer` without touching the grid.
    ///
    /// Returns true if any tile moved or merged. `turn` stamps merged tiles.
    pub fn slide(&self, direction: Direction, turn: u32, buffer: &mut MoveResultBuffer) -> bool {
        buffer.reset(self.cells.len());

        let n = self.size;
        let (dx, dy) = direction.vector();
        let mut moved = false;

        for y in 0..n {
            // Lines nearest the target edge resolve first.
            let cy = if dy <= 0 { y } else { n - 1 - y };
            for x in 0..n {
                let cx = if dx <= 0 { x } else { n - 1 - x };
                let goal = cy * n + cx;

                // Cells behind the goal, nearest first.
                let behind = if direction.is_horizontal() { n - x } else { n - y };
                for step in 1..behind {
                    let target = if direction.is_horizontal() {
                        let px = cx as isize - step as isize * dx as isize;
                        cy * n + px as usize
                    } else {
                        let py = cy as isize - step as isize * dy as isize;
                        py as usize * n + cx
                    };

                    let code = self.move_tile(target, goal, turn, buffer);
                    moved |= code.changed();
                    if code.stops() {
                        break;
                    }
                }
            }
        }

        moved
    }

    /// Dry run: would a slide in `direction` change anything?
    pub fn can_slide(&self, direction: Direction) -> bool {
        let mut scratch = MoveResultBuffer::new(self.cells.len());
        self.slide(direction, 0, &mut scratch)
    }

    /// Directions that would move or merge at least one tile
    pub fn legal_moves(&self) -> ArrayVec<Direction, 4> {
        Direction::ALL
            .into_iter()
            .filter(|&d| self.can_slide(d))
            .collect()
    }

    /// Terminal condition: no empty cell and no direction changes anything
    pub fn is_stuck(&self) -> bool {
        !self.has_empty() && Direction::ALL.into_iter().all(|d| !self.can_slide(d))
    }

    /// Apply a resolved buffer to the grid.
    ///
    /// Slots beyond the grid's length are ignored.
    pub fn commit(&mut self, buffer: &MoveResultBuffer) {
        for (cell, slot) in self.cells.iter_mut().zip(buffer.slots()) {
            match slot {
                Slot::Untouched => {}
                Slot::Vacated => *cell = None,
                Slot::Arrived(m) => *cell = Some(m.tile),
            }
        }
    }

    /// Place a new tile in a random empty cell.
    ///
    /// Picks `floor(next * len)` and probes forward (wrapping) past occupied
    /// cells. The tile is power 1, or power 2 when a second draw exceeds
    /// [`DOUBLE_SPAWN_THRESHOLD`]. Returns the chosen index, or None on a
    /// full grid (no draws are consumed in that case).
    pub fn spawn(&mut self, rng: &mut Alea, turn: u32) -> Option<usize> {
        if !self.has_empty() {
            return None;
        }

        let len = self.cells.len();
        let mut pos = rng.below(len);
        while self.cells[pos].is_some() {
            pos = (pos + 1) % len;
        }

        let mut tile = Tile::new(turn);
        if rng.next_f64() > DOUBLE_SPAWN_THRESHOLD {
            tile = tile.merged(turn);
        }
        self.cells[pos] = Some(tile);
        Some(pos)
    }
}
