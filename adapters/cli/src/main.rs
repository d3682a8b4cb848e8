#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter running a headless Sundown session.

mod layout;
mod session;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use sundown_core::{Difficulty, Layout};

use crate::session::Session;

/// Command-line arguments accepted by the Sundown binary.
#[derive(Debug, Parser)]
#[command(name = "sundown", about = "Runs a headless Sundown shootout")]
struct CliArgs {
    /// Difficulty selected in the menu. Overrides the layout file.
    #[arg(long, value_enum)]
    difficulty: Option<DifficultyArg>,
    /// Seed for every random stream. Overrides the layout file.
    #[arg(long)]
    seed: Option<u64>,
    /// Maximum number of ticks to simulate.
    #[arg(long, default_value_t = 6_000)]
    ticks: u32,
    /// Length of a tick in milliseconds.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
    /// TOML file describing the town. The built-in town is used otherwise.
    #[arg(long, value_name = "PATH")]
    layout: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DifficultyArg {
    Easy,
    Normal,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(value: DifficultyArg) -> Self {
        match value {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Normal => Difficulty::Normal,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

const DEFAULT_SEED: u64 = 0x5eed;

/// Entry point for the Sundown command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    let (town, settings) = match &args.layout {
        Some(path) => {
            let file = layout::load(path)
                .with_context(|| format!("failed to load layout from {}", path.display()))?;
            (file.layout, file.session)
        }
        None => (Layout::default(), layout::SessionSettings::default()),
    };

    let difficulty = args
        .difficulty
        .map(Difficulty::from)
        .or(settings.difficulty)
        .unwrap_or_default();
    let seed = args.seed.or(settings.seed).unwrap_or(DEFAULT_SEED);
    info!(
        "riding into town on {difficulty:?} with seed {seed} ({} spawn points)",
        town.spawn_points.len()
    );

    let mut session = Session::new(town, seed);
    session.start(difficulty);
    let summary = session.run(args.ticks, Duration::from_millis(args.tick_ms));
    println!("{summary}");
    Ok(())
}
