use std::cell::RefCell;
use std::rc::Rc;

use tui_2048::core::{GameConfig, MemoryScoreStore};
use tui_2048::engine::Session;
use tui_2048::term::{
    AdapterStatusView, BoardScene, FrameBuffer, GameView, LabelMode, TileAnimator, Viewport,
};
use tui_2048::types::{Direction, GameAction};

type Animator = Rc<RefCell<TileAnimator>>;

fn session(size: usize, seed: &str) -> (Session<MemoryScoreStore>, Animator) {
    let mut session = Session::new(&GameConfig::new(size, seed), MemoryScoreStore::new()).unwrap();
    let animator = Animator::default();
    session.attach(Box::new(Rc::clone(&animator)));
    session.start().unwrap();
    (session, animator)
}

fn render(
    view: &GameView,
    animator: &Animator,
    status: Option<&AdapterStatusView>,
    vp: Viewport,
) -> FrameBuffer {
    let mut animator = animator.borrow_mut();
    animator.finish();
    let sprites = animator.sprites();
    let scene = BoardScene::from_animator(&animator, &sprites);
    let mut fb = FrameBuffer::new(0, 0);
    view.render_into(&scene, status, vp, &mut fb);
    fb
}

fn text(fb: &FrameBuffer) -> String {
    (0..fb.height()).map(|y| fb.row_text(y)).collect::<Vec<_>>().join("\n")
}

#[test]
fn term_view_renders_border_corners() {
    let (_session, animator) = session(4, "0");
    // 4 cells of 6x3 plus the border => 26x14.
    let fb = render(&GameView::new(6, 3), &animator, None, Viewport::new(26, 14));

    assert_eq!(fb.get(0, 0).unwrap().ch, '╭');
    assert_eq!(fb.get(25, 0).unwrap().ch, '╮');
    assert_eq!(fb.get(0, 13).unwrap().ch, '╰');
    assert_eq!(fb.get(25, 13).unwrap().ch, '╯');
}

#[test]
fn term_view_draws_opening_tile_in_its_cell() {
    let (_session, animator) = session(4, "0");
    let fb = render(&GameView::new(6, 3), &animator, None, Viewport::new(26, 14));

    // Seed 0 places a 2 at (1, 2); the label sits mid-cell.
    let x = 1 + 6 + 2;
    let y = 1 + 2 * 3 + 1;
    assert_eq!(fb.get(x, y).unwrap().ch, '2');
    assert_eq!(fb.get(x + 1, 1 + 1).unwrap().ch, '·');
}

#[test]
fn term_view_side_panel_follows_the_session() {
    let (mut session, animator) = session(4, "0");
    for d in [Direction::Left, Direction::Up, Direction::Right] {
        session.apply(GameAction::Move(d)).unwrap();
    }
    let fb = render(&GameView::default(), &animator, None, Viewport::new(80, 24));
    let out = text(&fb);

    assert!(out.contains("SCORE"));
    assert!(out.contains("BEST"));
    assert!(out.contains("TURN"));
    assert!(out.contains("14"));
    assert!(!out.contains("AI"));
}

#[test]
fn term_view_shows_adapter_status() {
    let (_session, animator) = session(4, "0");
    let on = AdapterStatusView {
        enabled: true,
        client_count: 2,
        controller_id: Some(7),
    };
    let out = text(&render(&GameView::default(), &animator, Some(&on), Viewport::new(80, 24)));
    assert!(out.contains("AI ON"));
    assert!(out.contains("C 2  CTRL 7"));

    let idle = AdapterStatusView {
        enabled: true,
        client_count: 0,
        controller_id: None,
    };
    let out = text(&render(&GameView::default(), &animator, Some(&idle), Viewport::new(80, 24)));
    assert!(out.contains("CTRL -"));

    let off = AdapterStatusView {
        enabled: false,
        client_count: 0,
        controller_id: None,
    };
    let out = text(&render(&GameView::default(), &animator, Some(&off), Viewport::new(80, 24)));
    assert!(out.contains("AI OFF"));
}

#[test]
fn term_view_overlays_game_over_until_restart() {
    let (mut session, animator) = session(2, "0");
    let moves = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];
    for d in moves {
        session.apply(GameAction::Move(d)).unwrap();
    }
    assert!(session.game().is_game_over());

    let vp = Viewport::new(80, 24);
    let out = text(&render(&GameView::default(), &animator, None, vp));
    assert!(out.contains("GAME OVER"));
    assert!(out.contains("68"));

    session.apply(GameAction::Restart).unwrap();
    let out = text(&render(&GameView::default(), &animator, None, vp));
    assert!(!out.contains("GAME OVER"));
}

#[test]
fn term_view_glyph_labels() {
    let (_session, animator) = session(4, "0");
    let view = GameView::default().with_labels(LabelMode::Glyph);
    let out = text(&render(&view, &animator, None, Viewport::new(80, 24)));
    assert!(out.contains('∙'));
}
