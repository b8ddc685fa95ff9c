#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless driver that runs a Detour Defence match at a fixed frame rate.

mod auto_build;
mod settings;
mod summary;

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::Parser;
use detour_defence_core::Phase;
use detour_defence_engine::{Config, Engine};
use detour_defence_world::query;
use tracing::info;

use auto_build::AutoBuilder;
use summary::{Summary, Tally};

/// Command-line arguments for the headless driver.
#[derive(Debug, Parser)]
#[command(name = "detour-defence", about = "Runs a headless Detour Defence match")]
struct Args {
    /// Seed for stage generation and spawn rolls.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// TOML file overriding the default rules.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Frames to simulate before printing the summary.
    #[arg(long, default_value_t = 3_000)]
    ticks: u32,
    /// Simulated milliseconds per frame.
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,
    /// Place and upgrade towers automatically during countdowns.
    #[arg(long)]
    auto_build: bool,
    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,
    /// Log filter directive; falls back to `RUST_LOG`, then `info`.
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    settings::init_tracing(args.log_level.as_deref())?;
    let rules = settings::load_rules(args.config.as_deref())?;

    let mut engine = Engine::new(Config {
        seed: args.seed,
        rules,
    });
    let mut state = engine.init_match();
    let mut builder = args.auto_build.then(AutoBuilder::new);
    let mut tally = Tally::default();
    let dt = Duration::from_millis(args.tick_ms);

    for _ in 0..args.ticks {
        if let Some(builder) = builder.as_mut() {
            state = builder.act(&mut engine, state);
        }
        state = engine.tick(state, dt);
        tally.record(engine.events());
        if query::phase(&state) == Phase::GameOver {
            break;
        }
    }
    info!(
        stage = query::stage(&state),
        wave = query::wave(&state),
        "run finished"
    );

    let summary = Summary::new(args.seed, &state, &tally);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{summary}");
    }
    Ok(())
}
