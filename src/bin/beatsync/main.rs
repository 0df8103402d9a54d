//! beatsync - terminal chart player
//!
//! Run with: cargo run -- --bpm 128

mod app;
mod audio;
mod chart;
mod clock;
mod ui;

use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use env_logger::{Env, Target};

use app::App;
use beatsync::SyncConfig;

#[derive(Parser, Debug)]
#[command(name = "beatsync", about = "Play a generated chart against a synchronized clock")]
struct Args {
    /// Base tempo of the demo chart
    #[arg(long, default_value_t = beatsync::config::DEFAULT_BPM)]
    bpm: f64,

    /// Beats ahead of the playhead at which objects appear
    #[arg(long, default_value_t = beatsync::config::DEFAULT_SPAWN_OFFSET)]
    spawn: f64,

    /// Beats relative to the playhead at which objects disappear
    #[arg(long, default_value_t = beatsync::config::DEFAULT_DESPAWN_OFFSET, allow_hyphen_values = true)]
    despawn: f64,

    /// Chart length in bars of 4/4
    #[arg(long, default_value_t = 32)]
    bars: u32,

    /// Drive playback from the wall clock instead of an audio stream
    #[arg(long)]
    silent: bool,

    /// Write logs to this file (the terminal belongs to the UI)
    #[arg(long)]
    log: Option<PathBuf>,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let args = Args::parse();

    if let Some(path) = &args.log {
        let file = File::create(path).wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
        env_logger::Builder::from_env(Env::default().default_filter_or("debug"))
            .target(Target::Pipe(Box::new(file)))
            .init();
    }

    let config = SyncConfig::new().bpm(args.bpm).window(args.spawn, args.despawn);
    let mut app = App::new(&config, chart::demo(args.bars, args.bpm), args.silent)?;

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();
    result
}
