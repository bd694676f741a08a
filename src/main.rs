//! BLOCKFALL - terminal host for the falling-block engine

mod audio;
mod input;
mod ui;

use audio::{AudioManager, Sfx};
use blockfall::engine::{Direction, Engine};
use blockfall::settings::Settings;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use input::{Action, KeyBindings};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    io::{self, stdout},
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Target frame rate
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);

#[derive(Debug, Parser)]
#[command(name = "blockfall", version, about = "A falling-block puzzle game for the terminal")]
struct Cli {
    #[arg(short, long, help = "Starting level (overrides settings)")]
    level: Option<u32>,

    #[arg(long, help = "Seed for a reproducible piece sequence")]
    seed: Option<u64>,

    #[arg(long, help = "Path to an alternate settings.toml")]
    config: Option<PathBuf>,
}

/// Get the blockfall temp directory, creating it if needed
fn blockfall_temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("blockfall");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

/// Load settings from `path`, writing the defaults there on first run
fn load_settings(path: Option<PathBuf>) -> Settings {
    let Some(path) = path.or_else(Settings::default_path) else {
        return Settings::default();
    };

    if path.exists() {
        return Settings::load_from(&path);
    }

    let settings = Settings::default();
    if let Err(e) = settings.save_to(&path) {
        warn!("Could not write default settings: {}", e);
    }
    settings
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    // Generate session ID for this instance
    let session_id: u32 = rand::random();
    let log_dir = blockfall_temp_dir();
    let log_file = format!("{:08x}.log", session_id);

    // Setup tracing to log file; the terminal belongs to the UI
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("blockfall=debug")),
        )
        .with_ansi(false)
        .init();

    info!(
        "BLOCKFALL starting up, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    let mut settings = load_settings(cli.config);
    if let Some(level) = cli.level {
        settings.gameplay.initial_level = level;
    }
    let seed = cli.seed.unwrap_or_else(rand::random);
    info!(seed, initial_level = settings.gameplay.initial_level, "new game");

    let mut engine = Engine::with_board(settings.new_board(), settings.engine_config(), seed);
    let bindings = KeyBindings::from_settings(&settings);

    // Initialize audio (optional - game works without audio)
    let mut audio = AudioManager::new();
    if let Some(a) = audio.as_mut() {
        a.set_sfx_volume(settings.audio.sfx_volume as f32 / 100.0);
    }

    // Setup terminal
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut engine, &settings, &bindings, &mut audio);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;

    if result.is_ok() {
        println!("\nThanks for playing BLOCKFALL!");
        println!("Final Score: {}", engine.points());
        println!("Level: {} | Lines: {}", engine.level(), engine.lines());
    }

    result
}

fn play(audio: &mut Option<AudioManager>, sfx: Sfx) {
    if let Some(audio) = audio {
        audio.play_sfx(sfx);
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    engine: &mut Engine,
    settings: &Settings,
    bindings: &KeyBindings,
    audio: &mut Option<AudioManager>,
) -> io::Result<()> {
    let base_interval = settings.base_interval();
    let mut tick_interval = engine.tick_interval(base_interval);
    let mut last_tick = Instant::now();
    let mut paused = false;
    let mut game_over_reported = false;

    loop {
        terminal.draw(|frame| ui::render_game(frame, engine, settings, paused))?;

        let running = !paused && !engine.is_game_over();
        let timeout = if running {
            tick_interval
                .saturating_sub(last_tick.elapsed())
                .min(FRAME_DURATION)
        } else {
            FRAME_DURATION
        };

        // Handle input
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match bindings.action_for(key) {
                    Some(Action::Quit) => {
                        info!(points = engine.points(), "quit");
                        return Ok(());
                    }
                    Some(Action::Pause) if !engine.is_game_over() => {
                        paused = !paused;
                        last_tick = Instant::now();
                    }
                    Some(action) if running => handle_action(engine, action, audio),
                    _ => {}
                }
            }
        }

        // Gravity
        if !paused && !engine.is_game_over() && last_tick.elapsed() >= tick_interval {
            engine.tick();
            last_tick = Instant::now();
        }

        if let Some(lock) = engine.take_lock_event() {
            if lock.leveled_up {
                tick_interval = engine.tick_interval(base_interval);
                info!(level = engine.level(), interval_ms = tick_interval.as_millis() as u64, "speed up");
                play(audio, Sfx::LevelUp);
            } else if lock.lines_cleared > 0 {
                play(audio, Sfx::RowClear);
            }
        }

        if engine.is_game_over() && !game_over_reported {
            game_over_reported = true;
            play(audio, Sfx::GameOver);
            match serde_json::to_string(&engine.snapshot()) {
                Ok(json) => info!(snapshot = %json, "final state"),
                Err(e) => warn!("Could not serialize final state: {}", e),
            }
        }
    }
}

/// Forward one gameplay action to the engine
fn handle_action(engine: &mut Engine, action: Action, audio: &mut Option<AudioManager>) {
    match action {
        Action::MoveLeft => {
            if engine.move_piece(Direction::Left) {
                play(audio, Sfx::Move);
            }
        }
        Action::MoveRight => {
            if engine.move_piece(Direction::Right) {
                play(audio, Sfx::Move);
            }
        }
        Action::SoftDrop => {
            engine.move_piece(Direction::Down);
        }
        Action::HardDrop => {
            engine.hard_drop();
        }
        Action::Rotate => {
            if engine.rotate() {
                play(audio, Sfx::Rotate);
            }
        }
        Action::Hold => {
            engine.hold_active_piece();
        }
        Action::Pause | Action::Quit => {}
    }
}
