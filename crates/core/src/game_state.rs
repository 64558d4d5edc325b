//! Game state module - one 2048 session
//!
//! Ties the grid, the PRNG and the scoring rule together and drives the turn
//! lifecycle: `init` clears the board, `run` places the opening tile, and
//! every `step` resolves a slide, commits it, spawns a tile and scores.
//!
//! Scoring: after each committed turn the value of every tile stamped with
//! the current turn (merge results and the freshly spawned tile) is added to
//! the score.

use crate::board::Grid;
use crate::buffer::MoveResultBuffer;
use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::rng::Alea;
use crate::snapshot::{GameSnapshot, TurnFrame};
use crate::types::{Direction, GamePhase};

/// What a call to [`Game::run`] or [`Game::step`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnOutcome {
    /// Opening tile placed
    Started,
    /// Tiles moved; a new tile was spawned and the score updated
    Moved,
    /// Nothing moved, moves remain
    Blocked,
    /// Nothing moved and no move remains; the session is over
    GameOver,
    /// The session was already over; nothing changed
    Ignored,
}

impl TurnOutcome {
    pub fn moved(self) -> bool {
        matches!(self, TurnOutcome::Moved)
    }
}

/// Summary of one turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TurnReport {
    pub turn: u32,
    pub outcome: TurnOutcome,
    /// Score after the turn
    pub score: u64,
    /// Points added by the turn
    pub gained: u64,
    pub merges: usize,
    /// Cell that received the new tile
    pub spawned: Option<usize>,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct Game {
    grid: Grid,
    rng: Alea,
    turn: u32,
    score: u64,
    phase: GamePhase,
    /// Result of the most recent slide (input to the render adapter)
    buffer: MoveResultBuffer,
}

impl Game {
    /// Create an initialised game (empty board, turn 0, score 0)
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = Grid::new(config.grid_size)?;
        let buffer = MoveResultBuffer::new(grid.len());
        Ok(Self {
            grid,
            rng: Alea::new(&config.seed),
            turn: 0,
            score: 0,
            phase: GamePhase::Active,
            buffer,
        })
    }

    /// Shorthand for a game with default settings apart from size and seed
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_2048_core::{Game, TurnOutcome};
    /// use tui_2048_core::types::Direction;
    ///
    /// let mut game = Game::with_seed(4, 0).unwrap();
    /// assert_eq!(game.run().outcome, TurnOutcome::Started);
    /// assert_eq!(game.score(), 2);
    /// assert_eq!(game.step(Direction::Left).outcome, TurnOutcome::Moved);
    /// assert_eq!(game.score(), 4);
    /// ```
    pub fn with_seed(grid_size: usize, seed: impl std::fmt::Display) -> Result<Self, ConfigError> {
        Self::new(&GameConfig::new(grid_size, seed.to_string()))
    }

    /// Reset board, turn, score and phase; the PRNG stream continues
    pub fn init(&mut self) {
        self.grid.clear();
        self.buffer.reset(self.grid.len());
        self.turn = 0;
        self.score = 0;
        self.phase = GamePhase::Active;
    }

    /// Place the opening tile and score it
    pub fn run(&mut self) -> TurnReport {
        self.buffer.reset(self.grid.len());
        let spawned = self.grid.spawn(&mut self.rng, self.turn);
        let gained = self.calc_score();
        self.report(TurnOutcome::Started, gained, spawned)
    }

    /// `init` followed by `run`
    pub fn restart(&mut self) -> TurnReport {
        self.init();
        self.run()
    }

    /// Play one turn in `direction`
    pub fn step(&mut self, direction: Direction) -> TurnReport {
        self.advance(Some(direction))
    }

    /// Play one turn from a raw `(dx, dy)` vector.
    ///
    /// Vectors that are not a unit axis step still consume a turn but move
    /// nothing.
    pub fn step_vector(&mut self, dx: i32, dy: i32) -> TurnReport {
        self.advance(Direction::from_vector(dx, dy))
    }

    fn advance(&mut self, direction: Option<Direction>) -> TurnReport {
        if self.phase == GamePhase::GameOver {
            return TurnReport {
                turn: self.turn,
                outcome: TurnOutcome::Ignored,
                score: self.score,
                gained: 0,
                merges: 0,
                spawned: None,
            };
        }

        self.turn += 1;
        let moved = match direction {
            Some(d) => self.grid.slide(d, self.turn, &mut self.buffer),
            None => {
                self.buffer.reset(self.grid.len());
                false
            }
        };

        if moved {
            self.grid.commit(&self.buffer);
            let spawned = self.grid.spawn(&mut self.rng, self.turn);
            let gained = self.calc_score();
            return self.report(TurnOutcome::Moved, gained, spawned);
        }

        // Game over is only noticed when a move fails.
        if self.grid.is_stuck() {
            self.phase = GamePhase::GameOver;
            return self.report(TurnOutcome::GameOver, 0, None);
        }
        self.report(TurnOutcome::Blocked, 0, None)
    }

    fn calc_score(&mut self) -> u64 {
        let turn = self.turn;
        let gained = self
            .grid
            .cells()
            .iter()
            .flatten()
            .filter(|t| t.turn() == turn)
            .map(|t| t.score())
            .fold(0u64, u64::saturating_add);
        self.score = self.score.saturating_add(gained);
        gained
    }

    fn report(&self, outcome: TurnOutcome, gained: u64, spawned: Option<usize>) -> TurnReport {
        TurnReport {
            turn: self.turn,
            outcome,
            score: self.score,
            gained,
            merges: self.buffer.merge_count(),
            spawned,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn rng(&self) -> &Alea {
        &self.rng
    }

    /// Render-ready picture of the current turn
    pub fn frame(&self, animate: bool) -> TurnFrame {
        TurnFrame::build(&self.grid, &self.buffer, self.turn, self.score, animate)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            grid_size: self.grid.size(),
            turn: self.turn,
            score: self.score,
            phase: self.phase,
            cells: self.grid.cells().to_vec(),
            rng: self.rng.state(),
        }
    }

    /// Rebuild a game from a snapshot; the next turn continues bit-exactly
    pub fn restore(snapshot: GameSnapshot) -> Result<Self, ConfigError> {
        let grid = Grid::from_cells(snapshot.grid_size, snapshot.cells)?;
        let buffer = MoveResultBuffer::new(grid.len());
        Ok(Self {
            grid,
            rng: Alea::from_state(snapshot.rng),
            turn: snapshot.turn,
            score: snapshot.score,
            phase: snapshot.phase,
            buffer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::Tile;

    fn started(size: usize, seed: &str) -> Game {
        let mut game = Game::with_seed(size, seed).unwrap();
        game.run();
        game
    }

    #[test]
    fn test_new_game_is_empty() {
        let game = Game::with_seed(4, 0).unwrap();
        assert!(game.grid().is_empty());
        assert_eq!(game.turn(), 0);
        assert_eq!(game.score(), 0);
        assert_eq!(game.phase(), GamePhase::Active);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert_eq!(
            Game::with_seed(1, 0).err(),
            Some(ConfigError::InvalidGridSize(1))
        );
    }

    #[test]
    fn test_run_places_and_scores_opening_tile() {
        let mut game = Game::with_seed(4, 0).unwrap();
        let report = game.run();
        assert_eq!(report.outcome, TurnOutcome::Started);
        assert_eq!(report.spawned, Some(9));
        assert_eq!(report.score, 2);
        assert_eq!(game.grid().occupied_count(), 1);
        assert_eq!(game.grid().get(1, 2).flatten(), Some(Tile::new(0)));
    }

    #[test]
    fn test_blocked_step_consumes_a_turn() {
        // seed 42 opens in the bottom-left corner, so Left moves nothing.
        let mut game = started(3, "42");
        let before = game.grid().clone();
        let report = game.step(Direction::Left);
        assert_eq!(report.outcome, TurnOutcome::Blocked);
        assert_eq!(report.turn, 1);
        assert_eq!(report.score, 2);
        assert_eq!(game.grid(), &before);
    }

    #[test]
    fn test_non_axis_vector_moves_nothing() {
        let mut game = started(4, "0");
        let before = game.grid().clone();
        let rng_before = game.rng().state();
        let report = game.step_vector(1, 1);
        assert_eq!(report.outcome, TurnOutcome::Blocked);
        assert_eq!(report.turn, 1);
        assert_eq!(game.grid(), &before);
        assert_eq!(game.rng().state(), rng_before);

        assert_eq!(game.step_vector(0, 0).outcome, TurnOutcome::Blocked);
        assert_eq!(game.step_vector(-1, 0).outcome, TurnOutcome::Moved);
    }

    #[test]
    fn test_merge_and_spawn_both_score() {
        let mut game = Game::restore(GameSnapshot {
            grid_size: 2,
            turn: 3,
            score: 10,
            phase: GamePhase::Active,
            cells: vec![Some(Tile::new(0)), Some(Tile::new(1)), None, None],
            rng: Alea::new(0).state(),
        })
        .unwrap();

        let report = game.step(Direction::Left);
        assert_eq!(report.outcome, TurnOutcome::Moved);
        assert_eq!(report.turn, 4);
        assert_eq!(report.merges, 1);
        // 4 from the merge plus 2 from the spawned tile.
        assert_eq!(report.gained, 6);
        assert_eq!(report.score, 16);
        assert_eq!(game.grid().tile(0).map(|t| t.power()), Some(2));
    }

    #[test]
    fn test_game_over_then_ignored() {
        let mut game = Game::restore(GameSnapshot {
            grid_size: 2,
            turn: 5,
            score: 40,
            phase: GamePhase::Active,
            cells: [1, 2, 2, 1].iter().map(|&p| Some(Tile::with_power(0, p))).collect(),
            rng: Alea::new(0).state(),
        })
        .unwrap();

        let report = game.step(Direction::Up);
        assert_eq!(report.outcome, TurnOutcome::GameOver);
        assert_eq!(report.turn, 6);
        assert!(game.is_game_over());

        let report = game.step(Direction::Down);
        assert_eq!(report.outcome, TurnOutcome::Ignored);
        assert_eq!(report.turn, 6);
        assert_eq!(report.score, 40);
    }

    #[test]
    fn test_restart_keeps_rng_stream() {
        let mut game = started(4, "0");
        game.step(Direction::Left);
        let rng_before = game.rng().state();

        let report = game.restart();
        assert_eq!(report.outcome, TurnOutcome::Started);
        assert_eq!(report.turn, 0);
        assert_eq!(game.phase(), GamePhase::Active);
        assert_eq!(game.grid().occupied_count(), 1);
        assert_ne!(game.rng().state(), rng_before);

        let mut fresh = Game::restore(GameSnapshot {
            grid_size: 4,
            turn: 0,
            score: 0,
            phase: GamePhase::Active,
            cells: vec![None; 16],
            rng: rng_before,
        })
        .unwrap();
        fresh.run();
        assert_eq!(fresh.grid(), game.grid());
    }

    #[test]
    fn test_snapshot_restore_continues_identically() {
        let mut game = started(4, "0");
        game.step(Direction::Left);
        game.step(Direction::Up);

        let mut copy = Game::restore(game.snapshot()).unwrap();
        for d in [Direction::Right, Direction::Down, Direction::Left] {
            assert_eq!(game.step(d), copy.step(d));
        }
        assert_eq!(game.snapshot(), copy.snapshot());
    }

    #[test]
    fn test_frame_marks_spawned_tile() {
        let mut game = started(4, "0");
        game.step(Direction::Left);
        let frame = game.frame(true);
        assert_eq!(frame.turn, 1);
        assert_eq!(frame.tiles.len(), 2);
        let spawned: Vec<_> = frame.spawned().collect();
        assert_eq!(spawned.len(), 1);
        assert_eq!(spawned[0].from, None);

        let slid = frame.tile_at(0, 2).unwrap();
        assert_eq!(slid.from, Some((1, 2)));
        assert_eq!(slid.distance(), 1);
    }
}
