//! Swipe recognition.
//!
//! A swipe is the displacement between the first and the last pointer
//! position. Short swipes are dropped; otherwise the dominant axis decides,
//! and an exact diagonal resolves to no move.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::types::{Direction, GameAction, SWIPE_MIN_DISTANCE};

/// Approximate pixel size of one terminal cell, used to scale mouse drags
pub const CELL_WIDTH_PX: f32 = 10.0;
pub const CELL_HEIGHT_PX: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeTracker {
    start: Option<(f32, f32)>,
    last: Option<(f32, f32)>,
    min_distance: f32,
}

impl Default for SwipeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SwipeTracker {
    pub fn new() -> Self {
        Self::with_min_distance(SWIPE_MIN_DISTANCE)
    }

    pub fn with_min_distance(min_distance: f32) -> Self {
        Self {
            start: None,
            last: None,
            min_distance,
        }
    }

    pub fn begin(&mut self, x: f32, y: f32) {
        self.start = Some((x, y));
        self.last = None;
    }

    pub fn update(&mut self, x: f32, y: f32) {
        if self.start.is_some() {
            self.last = Some((x, y));
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.start.is_some()
    }

    /// Finish the gesture and classify it
    pub fn end(&mut self) -> Option<Direction> {
        let start = self.start.take()?;
        let last = self.last.take()?;

        let dx = start.0 - last.0;
        let dy = start.1 - last.1;
        let longest = dx.abs().max(dy.abs());
        if longest < self.min_distance {
            return None;
        }

        let axis = |d: f32| {
            if d.abs() == longest {
                -(d.signum() as i32)
            } else {
                0
            }
        };
        Direction::from_vector(axis(dx), axis(dy))
    }

    pub fn cancel(&mut self) {
        self.start = None;
        self.last = None;
    }
}

/// Feed a mouse event into the tracker; a left-button drag ending in a
/// release yields a move.
pub fn handle_mouse_event(tracker: &mut SwipeTracker, event: MouseEvent) -> Option<GameAction> {
    let x = event.column as f32 * CELL_WIDTH_PX;
    let y = event.row as f32 * CELL_HEIGHT_PX;
    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            tracker.begin(x, y);
            None
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            tracker.update(x, y);
            None
        }
        MouseEventKind::Up(MouseButton::Left) => {
            tracker.update(x, y);
            tracker.end().map(GameAction::Move)
        }
        _ => None,
    }
}
