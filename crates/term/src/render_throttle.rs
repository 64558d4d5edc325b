//! Frame pacing for the terminal loop.
//!
//! While tiles are moving every tick is drawn. Once the board is still, a new
//! frame is drawn only when its fingerprint changes, plus an occasional
//! refresh so a resized or scribbled-over terminal recovers.

#[derive(Debug, Clone)]
pub struct RenderThrottle {
    min_static_interval_ms: u64,
    last_render_ms: u64,
    last_fingerprint: u64,
    has_rendered: bool,
}

impl RenderThrottle {
    pub fn new(min_static_interval_ms: u64) -> Self {
        Self {
            min_static_interval_ms,
            last_render_ms: 0,
            last_fingerprint: 0,
            has_rendered: false,
        }
    }

    /// Decide whether to draw now.
    ///
    /// `animating` frames are always drawn; still frames are drawn on a
    /// fingerprint change or after `min_static_interval_ms`.
    pub fn should_render(&mut self, now_ms: u64, fingerprint: u64, animating: bool) -> bool {
        let changed = !self.has_rendered || animating || fingerprint != self.last_fingerprint;
        let stale = now_ms.saturating_sub(self.last_render_ms) >= self.min_static_interval_ms;
        if !(changed || stale) {
            return false;
        }
        self.has_rendered = true;
        self.last_render_ms = now_ms;
        self.last_fingerprint = fingerprint;
        true
    }

    /// Force the next call to draw
    pub fn reset(&mut self) {
        self.has_rendered = false;
    }
}
