//! Render sink that streams observations to remote clients

use tokio::sync::mpsc;

use tui_2048_core::{GameEvent, RenderSink, TurnFrame};

use crate::protocol::ObservationMessage;
use crate::runtime::OutboundMessage;

/// Publishes one observation per drawn turn and one on game over.
///
/// A `Draw` is held back until the `BestScore` that follows it, so the
/// broadcast carries the updated best.
pub struct ObservationSink {
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    frame: Option<TurnFrame>,
    best: u64,
    game_over: bool,
    seq: u64,
}

impl ObservationSink {
    pub fn new(out_tx: mpsc::UnboundedSender<OutboundMessage>) -> Self {
        Self {
            out_tx,
            frame: None,
            best: 0,
            game_over: false,
            seq: 0,
        }
    }

    /// Observation of the last drawn frame
    pub fn latest(&mut self) -> Option<ObservationMessage> {
        let frame = self.frame.as_ref()?;
        self.seq += 1;
        Some(ObservationMessage::from_frame(
            frame,
            self.seq,
            self.best,
            self.game_over,
        ))
    }

    /// Answer a late joiner with the current board
    pub fn send_snapshot(&mut self, client_id: u64) {
        if let Some(obs) = self.latest() {
            let _ = self
                .out_tx
                .send(OutboundMessage::ToClientObservation { client_id, obs });
        }
    }

    fn broadcast(&mut self) {
        if let Some(obs) = self.latest() {
            let _ = self.out_tx.send(OutboundMessage::BroadcastObservation { obs });
        }
    }
}

impl RenderSink for ObservationSink {
    fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Draw(frame) => {
                self.frame = Some(frame.clone());
                self.game_over = false;
            }
            GameEvent::BestScore { best, .. } => {
                self.best = *best;
                self.broadcast();
            }
            GameEvent::GameOver { .. } => {
                self.game_over = true;
                self.broadcast();
            }
        }
    }
}
