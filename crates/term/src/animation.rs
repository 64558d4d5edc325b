//! Tile animation - turns discrete turn frames into moving sprites
//!
//! The animator is a [`RenderSink`]: it keeps the latest [`TurnFrame`] plus
//! score state, and the main loop feeds wall-clock time in through
//! [`TileAnimator::advance`]. Each tile slides from its `from` cell to its
//! destination over a time proportional to the distance it travels; merge
//! halves travel separately and fuse on arrival; spawned tiles appear once
//! all movement is done.

use crate::core::{FrameTile, GameEvent, RenderSink, TurnFrame};

/// Default slide time per crossed cell
pub const DEFAULT_MS_PER_CELL: u32 = 40;

/// One tile as it should be drawn right now, in fractional cell coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileSprite {
    pub x: f32,
    pub y: f32,
    pub power: u8,
    /// Spawned this turn (drawn with the highlight style)
    pub fresh: bool,
    /// Result of a merge that has landed this turn
    pub merged: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TileAnimator {
    frame: Option<TurnFrame>,
    elapsed_ms: u32,
    ms_per_cell: u32,
    score: u64,
    best: u64,
    game_over: bool,
}

impl TileAnimator {
    pub fn new() -> Self {
        Self::with_ms_per_cell(DEFAULT_MS_PER_CELL)
    }

    pub fn with_ms_per_cell(ms_per_cell: u32) -> Self {
        Self {
            ms_per_cell,
            ..Self::default()
        }
    }

    /// Move animation time forward
    pub fn advance(&mut self, elapsed_ms: u32) {
        self.elapsed_ms = self.elapsed_ms.saturating_add(elapsed_ms);
    }

    /// Skip to the end of the current animation
    pub fn finish(&mut self) {
        self.elapsed_ms = self.duration_ms();
    }

    /// Total time the current frame takes to settle
    pub fn duration_ms(&self) -> u32 {
        match &self.frame {
            Some(frame) if frame.animate => frame.max_distance() as u32 * self.ms_per_cell,
            _ => 0,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.elapsed_ms < self.duration_ms()
    }

    fn progress(&self, tile: &FrameTile, from: (u8, u8)) -> f32 {
        let Some(frame) = &self.frame else {
            return 1.0;
        };
        let distance = from.0.abs_diff(tile.x).max(from.1.abs_diff(tile.y)) as u32;
        let total = distance * self.ms_per_cell;
        if !frame.animate || total == 0 || self.elapsed_ms >= total {
            return 1.0;
        }
        self.elapsed_ms as f32 / total as f32
    }

    fn lerp(&self, tile: &FrameTile, from: (u8, u8), power: u8) -> TileSprite {
        let t = self.progress(tile, from);
        let x = from.0 as f32 + (tile.x as f32 - from.0 as f32) * t;
        let y = from.1 as f32 + (tile.y as f32 - from.1 as f32) * t;
        TileSprite {
            x,
            y,
            power,
            fresh: false,
            merged: false,
        }
    }

    /// Sprites for the current moment, appended to `out` (cleared first)
    pub fn sprites_into(&self, out: &mut Vec<TileSprite>) {
        out.clear();
        let Some(frame) = &self.frame else {
            return;
        };
        let moving = self.is_animating();

        for tile in &frame.tiles {
            if tile.spawned {
                if !moving {
                    out.push(TileSprite {
                        x: tile.x as f32,
                        y: tile.y as f32,
                        power: tile.power,
                        fresh: frame.animate,
                        merged: false,
                    });
                }
                continue;
            }

            let from = tile.from.unwrap_or((tile.x, tile.y));
            if tile.merged && moving {
                // Both halves still travelling; the destination half may have
                // been static all along.
                let half = tile.power.saturating_sub(1).max(1);
                out.push(self.lerp(tile, from, half));
                let partner = tile.partner_from.unwrap_or((tile.x, tile.y));
                out.push(self.lerp(tile, partner, half));
                continue;
            }

            let mut sprite = self.lerp(tile, from, tile.power);
            sprite.merged = tile.merged && frame.animate;
            out.push(sprite);
        }
    }

    pub fn sprites(&self) -> Vec<TileSprite> {
        let mut out = Vec::new();
        self.sprites_into(&mut out);
        out
    }

    pub fn frame(&self) -> Option<&TurnFrame> {
        self.frame.as_ref()
    }

    pub fn grid_size(&self) -> usize {
        self.frame.as_ref().map_or(0, |f| f.grid_size)
    }

    pub fn turn(&self) -> u32 {
        self.frame.as_ref().map_or(0, |f| f.turn)
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn best(&self) -> u64 {
        self.best
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }
}

impl RenderSink for TileAnimator {
    fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Draw(frame) => {
                self.score = frame.score;
                self.frame = Some(frame.clone());
                self.elapsed_ms = 0;
                self.game_over = false;
            }
            GameEvent::BestScore { score, best } => {
                self.score = *score;
                self.best = *best;
            }
            GameEvent::GameOver { score, .. } => {
                self.score = *score;
                self.game_over = true;
            }
        }
    }
}
