//! GameView: maps the animated board into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::animation::{TileAnimator, TileSprite};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::tile_title;

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterStatusView {
    pub enabled: bool,
    pub client_count: u16,
    pub controller_id: Option<u64>,
}

/// What a tile shows: its number, or the glyph title of its power
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelMode {
    #[default]
    Value,
    Glyph,
}

/// Everything the view needs for one frame
#[derive(Debug, Clone, Copy)]
pub struct BoardScene<'a> {
    pub grid_size: usize,
    pub sprites: &'a [TileSprite],
    pub score: u64,
    pub best: u64,
    pub turn: u32,
    pub game_over: bool,
}

impl<'a> BoardScene<'a> {
    pub fn from_animator(animator: &TileAnimator, sprites: &'a [TileSprite]) -> Self {
        Self {
            grid_size: animator.grid_size(),
            sprites,
            score: animator.score(),
            best: animator.best(),
            turn: animator.turn(),
            game_over: animator.is_game_over(),
        }
    }
}

/// Cell sizes tried from largest to smallest until the board fits
const CELL_SIZES: [(u16, u16); 4] = [(8, 3), (6, 3), (5, 1), (3, 1)];

const BOARD_BG: Rgb = Rgb::new(60, 56, 52);
const EMPTY_BG: Rgb = Rgb::new(84, 78, 72);

/// A lightweight terminal renderer for the 2048 board.
pub struct GameView {
    labels: LabelMode,
    /// Fixed cell size; None picks the largest that fits.
    cell: Option<(u16, u16)>,
}

impl Default for GameView {
    fn default() -> Self {
        Self {
            labels: LabelMode::Value,
            cell: None,
        }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            labels: LabelMode::Value,
            cell: Some((cell_w.max(1), cell_h.max(1))),
        }
    }

    pub fn with_labels(mut self, labels: LabelMode) -> Self {
        self.labels = labels;
        self
    }

    pub fn labels(&self) -> LabelMode {
        self.labels
    }

    fn cell_size(&self, n: u16, viewport: Viewport) -> (u16, u16) {
        if let Some(cell) = self.cell {
            return cell;
        }
        CELL_SIZES
            .into_iter()
            .find(|&(w, h)| n * w + 2 <= viewport.width && n * h + 2 <= viewport.height)
            .unwrap_or((3, 1))
    }

    /// Render into an existing framebuffer (reused across frames).
    pub fn render_into(
        &self,
        scene: &BoardScene<'_>,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));

        let n = scene.grid_size as u16;
        if n == 0 {
            return;
        }
        let (cell_w, cell_h) = self.cell_size(n, viewport);
        let board_w = n * cell_w;
        let board_h = n * cell_h;
        let frame_w = board_w + 2;
        let frame_h = board_h + 2;

        // Leave room for the side panel when there is space for it.
        let total_w = frame_w + 2 + 14;
        let start_x = if viewport.width >= total_w {
            (viewport.width - total_w) / 2
        } else {
            viewport.width.saturating_sub(frame_w) / 2
        };
        let start_y = viewport.height.saturating_sub(frame_h) / 2;

        let border = CellStyle::new(Rgb::new(180, 170, 160), Rgb::new(0, 0, 0));
        fb.fill_rect(start_x + 1, start_y + 1, board_w, board_h, ' ', CellStyle::new(BOARD_BG, BOARD_BG));
        draw_border(fb, start_x, start_y, frame_w, frame_h, border);

        let origin = (start_x + 1, start_y + 1);
        let empty = CellStyle::new(Rgb::new(120, 112, 104), EMPTY_BG).dim();
        for y in 0..n {
            for x in 0..n {
                let px = origin.0 + x * cell_w;
                let py = origin.1 + y * cell_h;
                fb.fill_rect(px, py, cell_w, cell_h, ' ', empty);
                fb.put_char(px + cell_w / 2, py + cell_h / 2, '·', empty);
            }
        }

        // Landed merges on top of everything else.
        for sprite in scene.sprites.iter().filter(|s| !s.merged) {
            self.draw_tile(fb, origin, (cell_w, cell_h), sprite);
        }
        for sprite in scene.sprites.iter().filter(|s| s.merged) {
            self.draw_tile(fb, origin, (cell_w, cell_h), sprite);
        }

        draw_side_panel(fb, scene, adapter, viewport, start_x + frame_w + 2, start_y);

        if scene.game_over {
            let mid = start_y + frame_h / 2;
            let style = CellStyle::new(Rgb::new(255, 255, 255), Rgb::new(0, 0, 0)).bold();
            fb.put_str_centered(start_x, mid.saturating_sub(1), frame_w, " GAME OVER ", style);
            fb.put_str_centered(start_x, mid, frame_w, " r: restart ", style);
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, scene: &BoardScene<'_>, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(scene, None, viewport, &mut fb);
        fb
    }

    fn draw_tile(&self, fb: &mut FrameBuffer, origin: (u16, u16), cell: (u16, u16), sprite: &TileSprite) {
        let px = origin.0 + (sprite.x * cell.0 as f32).round().max(0.0) as u16;
        let py = origin.1 + (sprite.y * cell.1 as f32).round().max(0.0) as u16;

        let bg = tile_color(sprite.power);
        let fg = if bg.luma() > 150 {
            Rgb::new(70, 64, 58)
        } else {
            Rgb::new(250, 246, 242)
        };
        let mut style = CellStyle::new(fg, bg).bold();
        if sprite.fresh {
            style.bold = false;
        }
        fb.fill_rect(px, py, cell.0, cell.1, ' ', style);

        let label_y = py + cell.1 / 2;
        let value = 1u64.checked_shl(sprite.power as u32).unwrap_or(u64::MAX);
        let digits = decimal_len(value);
        if self.labels == LabelMode::Value && digits <= cell.0 {
            fb.put_u64(px + (cell.0 - digits) / 2, label_y, value, style);
        } else {
            fb.put_str_centered(px, label_y, cell.0, tile_title(sprite.power).trim(), style);
        }
    }
}

fn draw_border(fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
    if w < 2 || h < 2 {
        return;
    }

    fb.put_char(x, y, '╭', style);
    fb.put_char(x + w - 1, y, '╮', style);
    fb.put_char(x, y + h - 1, '╰', style);
    fb.put_char(x + w - 1, y + h - 1, '╯', style);

    for dx in 1..w - 1 {
        fb.put_char(x + dx, y, '─', style);
        fb.put_char(x + dx, y + h - 1, '─', style);
    }
    for dy in 1..h - 1 {
        fb.put_char(x, y + dy, '│', style);
        fb.put_char(x + w - 1, y + dy, '│', style);
    }
}

fn draw_side_panel(
    fb: &mut FrameBuffer,
    scene: &BoardScene<'_>,
    adapter: Option<&AdapterStatusView>,
    viewport: Viewport,
    panel_x: u16,
    start_y: u16,
) {
    if panel_x >= viewport.width || viewport.width - panel_x < 12 {
        return;
    }

    let label = CellStyle::new(Rgb::new(220, 220, 220), Rgb::new(0, 0, 0)).bold();
    let value = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
    let hint = value.dim();

    let mut y = start_y;
    for (title, number) in [("SCORE", scene.score), ("BEST", scene.best), ("TURN", scene.turn as u64)] {
        fb.put_str(panel_x, y, title, label);
        fb.put_u64(panel_x, y + 1, number, value);
        y = y.saturating_add(3);
    }

    if let Some(st) = adapter {
        fb.put_str(panel_x, y, "AI", label);
        if st.enabled {
            fb.put_str(panel_x + 3, y, "ON", value);
            fb.put_str(panel_x, y + 1, "C", value);
            fb.put_u64(panel_x + 2, y + 1, st.client_count as u64, value);
            fb.put_str(panel_x + 5, y + 1, "CTRL", value);
            match st.controller_id {
                Some(id) => fb.put_u64(panel_x + 10, y + 1, id, value),
                None => fb.put_char(panel_x + 10, y + 1, '-', value),
            }
        } else {
            fb.put_str(panel_x + 3, y, "OFF", value);
        }
        y = y.saturating_add(3);
    }

    fb.put_str(panel_x, y, "arrows/hjkl", hint);
    fb.put_str(panel_x, y + 1, "r restart", hint);
    fb.put_str(panel_x, y + 2, "q quit", hint);
}

/// Background colour of a tile by power
pub fn tile_color(power: u8) -> Rgb {
    const PALETTE: [Rgb; 12] = [
        Rgb::new(238, 228, 218),
        Rgb::new(237, 224, 200),
        Rgb::new(242, 177, 121),
        Rgb::new(245, 149, 99),
        Rgb::new(246, 124, 95),
        Rgb::new(246, 94, 59),
        Rgb::new(237, 207, 114),
        Rgb::new(237, 204, 97),
        Rgb::new(237, 200, 80),
        Rgb::new(237, 197, 63),
        Rgb::new(237, 194, 46),
        Rgb::new(60, 58, 50),
    ];
    let i = (power.max(1) as usize - 1).min(PALETTE.len() - 1);
    PALETTE[i]
}

fn decimal_len(mut n: u64) -> u16 {
    let mut len = 1;
    while n >= 10 {
        n /= 10;
        len += 1;
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sprite(x: f32, y: f32, power: u8) -> TileSprite {
        TileSprite {
            x,
            y,
            power,
            fresh: false,
            merged: false,
        }
    }

    fn scene(sprites: &[TileSprite]) -> BoardScene<'_> {
        BoardScene {
            grid_size: 4,
            sprites,
            score: 1234,
            best: 5678,
            turn: 7,
            game_over: false,
        }
    }

    fn text(fb: &FrameBuffer) -> String {
        (0..fb.height()).map(|y| fb.row_text(y)).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn test_tile_values_are_drawn() {
        let sprites = [sprite(0.0, 0.0, 1), sprite(3.0, 3.0, 11)];
        let fb = GameView::default().render(&scene(&sprites), Viewport::new(80, 24));
        let out = text(&fb);
        assert!(out.contains(" 2 "));
        assert!(out.contains("2048"));
    }

    #[test]
    fn test_glyph_labels() {
        let sprites = [sprite(1.0, 1.0, 4)];
        let view = GameView::default().with_labels(LabelMode::Glyph);
        let out = text(&view.render(&scene(&sprites), Viewport::new(80, 24)));
        assert!(out.contains('◉'));
    }

    #[test]
    fn test_side_panel_shows_scores() {
        let fb = GameView::default().render(&scene(&[]), Viewport::new(80, 24));
        let out = text(&fb);
        assert!(out.contains("SCORE"));
        assert!(out.contains("1234"));
        assert!(out.contains("BEST"));
        assert!(out.contains("5678"));
    }

    #[test]
    fn test_game_over_overlay() {
        let mut s = scene(&[]);
        assert!(!text(&GameView::default().render(&s, Viewport::new(80, 24))).contains("GAME OVER"));
        s.game_over = true;
        assert!(text(&GameView::default().render(&s, Viewport::new(80, 24))).contains("GAME OVER"));
    }

    #[test]
    fn test_small_viewport_picks_smaller_cells() {
        let sprites = [sprite(0.0, 0.0, 3)];
        let fb = GameView::default().render(&scene(&sprites), Viewport::new(30, 8));
        assert_eq!(fb.width(), 30);
        assert!(text(&fb).contains('8'));
    }

    #[test]
    fn test_large_value_falls_back_to_glyph() {
        // 2^17 does not fit a 5-wide cell.
        let sprites = [sprite(0.0, 0.0, 17)];
        let out = text(&GameView::new(5, 1).render(&scene(&sprites), Viewport::new(80, 24)));
        assert!(out.contains('◌'));
    }

    #[test]
    fn test_empty_scene_renders_blank() {
        let mut s = scene(&[]);
        s.grid_size = 0;
        let fb = GameView::default().render(&s, Viewport::new(10, 4));
        assert!(fb.cells().iter().all(|c| c.ch == ' '));
    }
}
