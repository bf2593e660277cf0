//! Headless orbit run -- simulates a fixed number of frames and prints the
//! final world as JSON.
//!
//! Run with:
//!   cargo run --example orbits_headless -p orrery-engine [-- path/to/config.json]
//!
//! Set `RUST_LOG=orrery_engine=debug` to see spawns, signals and mode changes.

use anyhow::Context;
use orrery_engine::prelude::*;

/// Frames to simulate when the config sets no limit.
const DEFAULT_FRAMES: u64 = 600;

fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(&path)?,
        None => EngineConfig::default(),
    };
    // Belt speeds assume the configured frame rate, so step the clock by it.
    let frame_ms = config.frame_sleep_ms.max(1);
    config.max_active_frames = config.max_active_frames.or(Some(DEFAULT_FRAMES));

    let sprites = SpriteCatalog::with_defaults();
    let mut game = GameLoop::new(config, &sprites).context("building game loop")?;

    let clock = SteppingClock::new(0, frame_ms);
    let mut input = ScriptedInput::new([InputSnapshot::any_key()]).then(InputSnapshot::IDLE);
    let mut surface = DrawList::new();
    let mut events = EventLog::new();

    let summary = game.run(&clock, &mut input, &mut surface, &mut events);
    tracing::info!(
        frames = summary.frames,
        simulated = summary.simulated_frames,
        collisions = summary.collisions,
        events = events.events().len(),
        "run complete"
    );

    let json = game.snapshot().to_json_pretty().context("serializing snapshot")?;
    println!("{json}");
    Ok(())
}
