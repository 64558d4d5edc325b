//! Render contract - what the game tells the outside world after a turn

use std::cell::RefCell;
use std::rc::Rc;

use crate::snapshot::TurnFrame;

/// Signals emitted by a session to its render adapters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// Draw the board; `frame.animate` is false for the opening frame
    Draw(TurnFrame),
    /// Current and best score after a committed turn
    BestScore { score: u64, best: u64 },
    /// The session entered the terminal state
    GameOver { turn: u32, score: u64 },
}

/// A consumer of game events (terminal view, network stream, test probe, ...)
pub trait RenderSink {
    fn on_event(&mut self, event: &GameEvent);
}

/// A sink shared with the shell that reads it between turns
impl<T: RenderSink + ?Sized> RenderSink for Rc<RefCell<T>> {
    fn on_event(&mut self, event: &GameEvent) {
        self.borrow_mut().on_event(event);
    }
}

/// Collects every event; handy for tests and headless runs
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    pub events: Vec<GameEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> impl Iterator<Item = &TurnFrame> {
        self.events.iter().filter_map(|e| match e {
            GameEvent::Draw(frame) => Some(frame),
            _ => None,
        })
    }

    pub fn game_overs(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count()
    }
}

impl RenderSink for EventLog {
    fn on_event(&mut self, event: &GameEvent) {
        self.events.push(event.clone());
    }
}
