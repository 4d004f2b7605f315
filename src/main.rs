//! Road Dodger entry point
//!
//! Headless runner: drives the full screen state machine for a fixed number
//! of frames with scripted menu input and an optional autopilot.

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;

use road_dodger::assets::SpriteAtlas;
use road_dodger::audio::SilentOutput;
use road_dodger::consts::FPS;
use road_dodger::platform::{FrameClock, Key, KeyEvent, KeyState};
use road_dodger::renderer::Surface;
use road_dodger::{Game, GameConfig, Screen};

/// Seconds a finished run stays on the game-over screen before restarting
const GAME_OVER_PAUSE: f32 = 1.0;

#[derive(Parser, Debug)]
#[command(name = "road-dodger")]
#[command(about = "Lane-based arcade driving game (headless runner)")]
struct Cli {
    /// Session seed; derived from the clock when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Frames to simulate
    #[arg(long, default_value_t = 3_600)]
    frames: u64,
    /// JSON config file; missing fields use defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the record file location
    #[arg(long)]
    record_file: Option<PathBuf>,
    /// Directory holding the sprite PNGs; painted placeholders when omitted
    #[arg(long)]
    assets: Option<PathBuf>,
    /// Override the playlist folder
    #[arg(long)]
    playlist_dir: Option<PathBuf>,
    /// Let the built-in driver steer (default)
    #[arg(long, overrides_with = "no_autopilot")]
    autopilot: bool,
    /// Drive straight ahead with no steering
    #[arg(long, overrides_with = "autopilot")]
    no_autopilot: bool,
    /// Pace frames against the wall clock instead of a fixed step
    #[arg(long)]
    realtime: bool,
    /// Simulated length of each music track (s)
    #[arg(long, default_value_t = 30.0)]
    track_length: f32,
    /// Write the last frame as raw RGBA8 bytes
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::default(),
    };
    if let Some(path) = cli.record_file.clone() {
        config.record_file = path;
    }
    if let Some(dir) = cli.playlist_dir.clone() {
        config.playlist.dir = dir;
    }
    config.validate().context("invalid configuration")?;

    let seed = cli.seed.unwrap_or_else(clock_seed);
    log::info!("Road Dodger (headless) starting with seed {seed}");

    let atlas = match &cli.assets {
        Some(dir) => SpriteAtlas::from_dir(dir)
            .with_context(|| format!("loading sprites from {}", dir.display()))?,
        None => SpriteAtlas::procedural(),
    };
    let output = Box::new(SilentOutput::with_track_length(cli.track_length));
    let mut game = Game::new(&config, &atlas, output, seed).context("starting game")?;
    game.set_autopilot(cli.autopilot || !cli.no_autopilot);

    let keys = KeyState::new();
    let mut surface = Surface::new(config.screen.width, config.screen.height);
    let mut clock = FrameClock::new(FPS);
    let fixed_dt = 1.0 / FPS as f32;

    let mut runs = 0u32;
    let mut best = 0u32;
    let mut game_over_time = 0.0f32;
    let mut frames = 0u64;

    while frames < cli.frames && game.is_running() {
        let dt = if cli.realtime { clock.tick() } else { fixed_dt };

        match game.screen() {
            Screen::Menu => game.handle_event(KeyEvent::Pressed(Key::Space)),
            Screen::GameOver { final_score, .. } => {
                if game_over_time == 0.0 {
                    runs += 1;
                    best = best.max(*final_score);
                    log::info!("Run {runs} ended with {final_score} points");
                }
                game_over_time += dt;
                if game_over_time >= GAME_OVER_PAUSE {
                    game_over_time = 0.0;
                    game.handle_event(KeyEvent::Pressed(Key::R));
                }
            }
            Screen::Cinematic { .. } | Screen::Playing | Screen::Help { .. } => {}
        }

        game.update(&keys, dt);
        game.draw(&mut surface);
        frames += 1;

        if cli.realtime {
            clock.wait();
        }
    }

    let session = game.session();
    println!("frames:  {frames}");
    println!("runs:    {runs}");
    println!("best:    {}", best.max(session.score));
    println!("level:   {}", session.difficulty.level);
    println!("record:  {}", game.records().obtain_record());
    println!("screen:  {}", game.screen().name());

    if let Some(path) = &cli.snapshot {
        fs::write(path, surface.as_bytes())
            .with_context(|| format!("writing snapshot {}", path.display()))?;
        log::info!(
            "Snapshot {}x{} written to {}",
            surface.width(),
            surface.height(),
            path.display()
        );
    }
    Ok(())
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
