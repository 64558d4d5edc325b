//! Session driver
//!
//! Wires a [`Game`] to its collaborators: the best-score store, the attached
//! render sinks and the move recorder. The game itself stays pure; every
//! side effect of a turn happens here.

use tracing::{debug, info};

use tui_2048_core::{
    ConfigError, Game, GameConfig, GameEvent, Leaderboard, RenderSink, ScoreStore, StoreError,
    TurnOutcome, TurnReport,
};
use tui_2048_core::types::{Direction, GameAction};

use crate::replay::{Recorder, Replay};

pub struct Session<S: ScoreStore> {
    game: Game,
    leaderboard: Leaderboard<S>,
    sinks: Vec<Box<dyn RenderSink>>,
    recorder: Recorder,
    animate: bool,
}

impl<S: ScoreStore> Session<S> {
    /// Build a session; call [`Session::start`] to place the opening tile
    pub fn new(config: &GameConfig, store: S) -> Result<Self, ConfigError> {
        let game = Game::new(config)?;
        Ok(Self {
            game,
            leaderboard: Leaderboard::load(store, config.leaderboard_key.clone()),
            sinks: Vec::new(),
            recorder: Recorder::new(config),
            animate: config.animate,
        })
    }

    /// Register a render sink; it receives every later event
    pub fn attach(&mut self, sink: Box<dyn RenderSink>) {
        self.sinks.push(sink);
    }

    /// Run the game and draw the opening frame without animation
    pub fn start(&mut self) -> Result<TurnReport, StoreError> {
        let report = self.game.run();
        info!(
            grid_size = self.game.grid().size(),
            score = report.score,
            "game started"
        );
        self.publish(false)?;
        Ok(report)
    }

    /// Play one turn
    pub fn step(&mut self, direction: Direction) -> Result<TurnReport, StoreError> {
        let report = self.game.step(direction);
        self.recorder.record(direction);
        debug!(
            turn = report.turn,
            ?direction,
            outcome = ?report.outcome,
            gained = report.gained,
            score = report.score,
            "turn"
        );

        match report.outcome {
            TurnOutcome::Moved => self.publish(self.animate)?,
            TurnOutcome::GameOver => {
                info!(
                    turn = report.turn,
                    score = report.score,
                    max_power = self.game.grid().max_power(),
                    "game over"
                );
                self.emit(&GameEvent::GameOver {
                    turn: report.turn,
                    score: report.score,
                });
            }
            TurnOutcome::Started | TurnOutcome::Blocked | TurnOutcome::Ignored => {}
        }
        Ok(report)
    }

    /// Fresh board; the PRNG stream continues
    pub fn restart(&mut self) -> Result<TurnReport, StoreError> {
        self.recorder.restart(self.game.rng().state());
        self.game.init();
        info!("restart");
        self.start()
    }

    pub fn apply(&mut self, action: GameAction) -> Result<TurnReport, StoreError> {
        match action {
            GameAction::Move(direction) => self.step(direction),
            GameAction::Restart => self.restart(),
        }
    }

    /// Draw the current frame and update the best score
    fn publish(&mut self, animate: bool) -> Result<(), StoreError> {
        let frame = self.game.frame(animate);
        self.emit(&GameEvent::Draw(frame));

        let score = self.game.score();
        let best = self.leaderboard.record(score)?;
        self.emit(&GameEvent::BestScore { score, best });
        Ok(())
    }

    fn emit(&mut self, event: &GameEvent) {
        for sink in &mut self.sinks {
            sink.on_event(event);
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn best(&self) -> u64 {
        self.leaderboard.best()
    }

    pub fn leaderboard(&self) -> &Leaderboard<S> {
        &self.leaderboard
    }

    /// Steps of the current game, replayable from scratch
    pub fn replay(&self) -> &Replay {
        self.recorder.replay()
    }
}
