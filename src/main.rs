//! Terminal 2048 runner (default binary).
//!
//! Uses crossterm for keyboard and mouse input and the framebuffer renderer
//! from `tui_2048::term`. Remote players can join over the TCP adapter
//! unless it is disabled.

use std::cell::RefCell;
use std::collections::hash_map::DefaultHasher;
use std::fs::OpenOptions;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tui_2048::adapter::{Adapter, FileScoreStore, InboundPayload, ObservationSink, OutboundMessage};
use tui_2048::core::{GameConfig, ScoreStore};
use tui_2048::engine::Session;
use tui_2048::input::{handle_key_event, handle_mouse_event, should_quit, SwipeTracker};
use tui_2048::term::{
    AdapterStatusView, BoardScene, FrameBuffer, GameView, LabelMode, RenderThrottle,
    TerminalRenderer, TileAnimator, Viewport,
};

/// Frame interval while the loop is idle or animating
const FRAME_MS: u64 = 16;

/// Redraw a still board at least this often
const STATIC_REFRESH_MS: u64 = 500;

#[derive(Parser, Debug)]
#[command(name = "tui-2048", version, about = "Deterministic 2048 in the terminal")]
struct Args {
    /// PRNG seed; the same seed and moves replay the same game
    #[arg(long)]
    seed: Option<String>,
    /// Board edge length (2..=16)
    #[arg(long)]
    grid_size: Option<usize>,
    /// JSON file holding the best score
    #[arg(long, env = "TUI_2048_SCORE_FILE", default_value = ".tui-2048-scores.json")]
    score_file: PathBuf,
    /// Draw turns without sliding animation
    #[arg(long)]
    no_animate: bool,
    /// Label tiles with glyph titles instead of numbers
    #[arg(long)]
    glyphs: bool,
    /// Keep the mouse free for text selection (disables swipes)
    #[arg(long)]
    no_mouse: bool,
    /// Do not start the TCP adapter
    #[arg(long)]
    no_adapter: bool,
    /// Write the move history as JSON on exit
    #[arg(long)]
    replay_out: Option<PathBuf>,
    /// Tracing filter, e.g. "info", "tui_2048_engine=debug"
    #[arg(long, env = "TUI_2048_LOG", default_value = "info")]
    log: String,
    /// Log file; logging is off without one since the terminal is in raw mode
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args)?;

    let config = build_config(&args)?;
    let store = FileScoreStore::open(&args.score_file)
        .with_context(|| format!("failed to open score file {}", args.score_file.display()))?;

    let adapter = if args.no_adapter {
        None
    } else {
        match Adapter::start_from_env() {
            Ok(adapter) => adapter,
            Err(e) => {
                warn!(error = %e, "adapter unavailable, playing locally");
                None
            }
        }
    };
    if let Some(adapter) = &adapter {
        info!(addr = %adapter.local_addr(), "adapter listening");
    }

    let mut term = TerminalRenderer::new().with_mouse(!args.no_mouse);
    term.enter()?;

    let result = run(&mut term, &args, &config, store, adapter);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn init_tracing(args: &Args) -> Result<()> {
    let Some(path) = &args.log_file else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(args.log.clone()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

/// Environment first, then command-line flags on top
fn build_config(args: &Args) -> Result<GameConfig> {
    let mut config = GameConfig::from_env()?;
    if let Some(seed) = &args.seed {
        config.apply("seed", seed)?;
    }
    if let Some(size) = args.grid_size {
        config.grid_size = size;
    }
    if args.no_animate {
        config.animate = false;
    }
    config.validate()?;
    Ok(config)
}

fn run<S: ScoreStore>(
    term: &mut TerminalRenderer,
    args: &Args,
    config: &GameConfig,
    store: S,
    mut adapter: Option<Adapter>,
) -> Result<()> {
    let mut session = Session::new(config, store)?;

    let animator = Rc::new(RefCell::new(TileAnimator::new()));
    session.attach(Box::new(Rc::clone(&animator)));
    let observer = adapter
        .as_ref()
        .map(|a| Rc::new(RefCell::new(ObservationSink::new(a.sender()))));
    if let Some(observer) = &observer {
        session.attach(Box::new(Rc::clone(observer)));
    }
    session.start()?;

    let labels = if args.glyphs {
        LabelMode::Glyph
    } else {
        LabelMode::Value
    };
    let view = GameView::default().with_labels(labels);
    let mut fb = FrameBuffer::new(0, 0);
    let mut throttle = RenderThrottle::new(STATIC_REFRESH_MS);
    let mut swipe = SwipeTracker::new();
    let mut sprites = Vec::new();

    let clock = Instant::now();
    let mut last_frame = clock;

    loop {
        // Remote commands.
        if let Some(adapter) = adapter.as_mut() {
            while let Some(cmd) = adapter.try_recv() {
                match cmd.payload {
                    InboundPayload::Action(action) => {
                        session.apply(action)?;
                        adapter.send(OutboundMessage::Ack {
                            client_id: cmd.client_id,
                            seq: cmd.seq,
                        });
                    }
                    InboundPayload::SnapshotRequest => {
                        if let Some(observer) = &observer {
                            observer.borrow_mut().send_snapshot(cmd.client_id);
                        }
                    }
                }
            }
        }

        let now = Instant::now();
        let elapsed = now.duration_since(last_frame).as_millis().min(u32::MAX as u128) as u32;
        last_frame = now;
        animator.borrow_mut().advance(elapsed);

        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let status = adapter.as_ref().map(|a| {
            let st = a.status();
            AdapterStatusView {
                enabled: true,
                client_count: st.client_count.min(u16::MAX as usize) as u16,
                controller_id: st.controller_id,
            }
        });
        {
            let animator = animator.borrow();
            let scene = BoardScene::from_animator(&animator, &sprites);
            let fingerprint = scene_fingerprint(&scene, status.as_ref(), w, h);
            let now_ms = clock.elapsed().as_millis() as u64;
            if throttle.should_render(now_ms, fingerprint, animator.is_animating()) {
                animator.sprites_into(&mut sprites);
                let scene = BoardScene::from_animator(&animator, &sprites);
                view.render_into(&scene, status.as_ref(), Viewport::new(w, h), &mut fb);
                term.draw_swap(&mut fb)?;
            }
        }

        // Input until the next frame.
        if !event::poll(Duration::from_millis(FRAME_MS))? {
            continue;
        }
        let action = match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if should_quit(key) {
                    break;
                }
                handle_key_event(key)
            }
            Event::Mouse(mouse) => handle_mouse_event(&mut swipe, mouse),
            Event::Resize(..) => {
                term.invalidate();
                throttle.reset();
                None
            }
            _ => None,
        };
        if let Some(action) = action {
            // A new turn replaces whatever is still sliding.
            animator.borrow_mut().finish();
            session.apply(action)?;
        }
    }

    info!(
        turn = session.game().turn(),
        score = session.game().score(),
        best = session.best(),
        bytes = term.bytes_written(),
        "quit"
    );
    if let Some(path) = &args.replay_out {
        let json = session.replay().to_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write replay {}", path.display()))?;
    }
    Ok(())
}

fn scene_fingerprint(
    scene: &BoardScene<'_>,
    status: Option<&AdapterStatusView>,
    w: u16,
    h: u16,
) -> u64 {
    let mut hasher = DefaultHasher::new();
    (scene.turn, scene.score, scene.best, scene.game_over).hash(&mut hasher);
    (w, h).hash(&mut hasher);
    status.map(|s| (s.client_count, s.controller_id)).hash(&mut hasher);
    hasher.finish()
}
