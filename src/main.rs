//! Terminal runner (default binary).
//!
//! Renders with the framebuffer renderer, reads keys through crossterm, and
//! optionally serves the remote-control adapter on a TCP port.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use tracing::{debug, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

use tui_blockfall::adapter::{Adapter, GameLink, ServerConfig};
use tui_blockfall::core::GameSnapshot;
use tui_blockfall::engine::{Session, SessionConfig};
use tui_blockfall::input::{handle_key_event, should_quit};
use tui_blockfall::term::{
    AdapterStatusView, FrameBuffer, GameView, StatusView, TerminalRenderer, Viewport,
};
use tui_blockfall::types::{
    DEFAULT_AI_PORT, DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH, GRAVITY_INTERVAL_MS, TICK_MS,
};

#[derive(Debug, Parser)]
#[command(name = "tui-blockfall", version, about = "Falling-block puzzle game for the terminal")]
struct Cli {
    #[arg(long, env = "BLOCKFALL_WIDTH", default_value_t = DEFAULT_BOARD_WIDTH, help = "Board width in cells")]
    width: u16,

    #[arg(long, env = "BLOCKFALL_HEIGHT", default_value_t = DEFAULT_BOARD_HEIGHT, help = "Board height in cells")]
    height: u16,

    #[arg(long, env = "BLOCKFALL_GRAVITY_MS", default_value_t = GRAVITY_INTERVAL_MS, help = "Milliseconds between gravity steps")]
    gravity_ms: u32,

    #[arg(long, env = "BLOCKFALL_SEED", help = "Seed for the piece sequence (default: clock)")]
    seed: Option<u32>,

    #[arg(long, env = "BLOCKFALL_CELL_WIDTH", default_value_t = 2, help = "Terminal columns per board cell")]
    cell_width: u16,

    #[arg(long, env = "BLOCKFALL_AI", help = "Serve the remote-control adapter")]
    ai: bool,

    #[arg(long, env = "BLOCKFALL_AI_HOST", default_value = "127.0.0.1", help = "Adapter bind address")]
    ai_host: String,

    #[arg(long, env = "BLOCKFALL_AI_PORT", default_value_t = DEFAULT_AI_PORT, help = "Adapter port (0 picks a free one)")]
    ai_port: u16,

    #[arg(long, env = "BLOCKFALL_LOG_FILE", help = "Write logs to this file (the terminal is busy drawing)")]
    log_file: Option<PathBuf>,

    #[arg(short = 'v', long, action = clap::ArgAction::Count, help = "Increase log verbosity (-v = INFO, -vv = DEBUG, -vvv = TRACE)")]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = SessionConfig {
        width: cli.width,
        height: cli.height,
        gravity_ms: cli.gravity_ms,
        seed: cli.seed.unwrap_or_else(clock_seed),
    };
    let mut session = Session::new(config).context("invalid game configuration")?;
    info!(?config, "session created");

    let adapter = if cli.ai {
        let adapter = Adapter::start(ServerConfig {
            host: cli.ai_host.clone(),
            port: cli.ai_port,
            ..ServerConfig::default()
        })
        .context("failed to start adapter")?;
        info!(addr = %adapter.local_addr(), "adapter ready");
        Some(adapter)
    } else {
        None
    };

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &mut session, adapter, GameView::new(cli.cell_width));

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn init_logging(cli: &Cli) -> Result<()> {
    let Some(path) = cli.log_file.as_ref() else {
        return Ok(());
    };
    let level = match cli.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let file = File::create(path).with_context(|| format!("cannot open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(level)
        .init();
    Ok(())
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}

fn run(
    term: &mut TerminalRenderer,
    session: &mut Session,
    mut adapter: Option<Adapter>,
    view: GameView,
) -> Result<()> {
    let mut fb = FrameBuffer::new(0, 0);
    let mut snap = GameSnapshot::default();
    let mut link = GameLink::new();

    let tick_duration = Duration::from_millis(TICK_MS as u64);
    let mut last_tick = Instant::now();

    loop {
        // Render.
        session.snapshot_into(&mut snap);
        let status = StatusView {
            adapter: adapter.as_ref().map(|a| {
                let st = a.status();
                AdapterStatusView {
                    client_count: st.client_count.min(u16::MAX as usize) as u16,
                    controller_id: st.controller_id,
                }
            }),
            last_score: session.last_game_over().map(|n| n.final_score),
        };
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        view.render_into(&snap, &status, Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        // Input with timeout until next tick.
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or_default();

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) => {
                    if should_quit(key) {
                        info!("quit requested");
                        return Ok(());
                    }
                    if let Some(action) = handle_key_event(key) {
                        session.apply(action);
                    }
                }
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }

        // Tick.
        let elapsed = last_tick.elapsed();
        if elapsed >= tick_duration {
            last_tick = Instant::now();
            session.advance(elapsed.as_millis().min(u32::MAX as u128) as u32);

            if let Some(adapter) = adapter.as_mut() {
                link.pump(adapter, session);
            }
            for event in session.take_events() {
                debug!(?event, "game event");
            }
        }
    }
}
