#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Horde session and reports how it
//! went.

mod session;

use std::{path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use horde_core::GameConfig;
use horde_world::World;
use log::info;

use crate::session::Session;

/// Runs a headless Horde survival session.
#[derive(Debug, Parser)]
#[command(name = "horde", version, about)]
struct Cli {
    /// TOML configuration; the bundled default is used when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Seconds of game time to simulate unless the player dies first.
    #[arg(long, default_value_t = 300.0)]
    seconds: f32,

    /// Milliseconds of game time advanced per tick.
    #[arg(long, default_value_t = 16)]
    dt_ms: u64,

    /// Overrides the seed from the configuration.
    #[arg(long)]
    seed: Option<u64>,

    /// Prints the run summary as JSON.
    #[arg(long)]
    json: bool,
}

/// Entry point for the Horde command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
    ensure!(cli.dt_ms > 0, "--dt-ms must be positive");
    let duration = Duration::try_from_secs_f32(cli.seconds)
        .with_context(|| format!("--seconds {} is not a valid duration", cli.seconds))?;

    let mut config = match &cli.config {
        Some(path) => GameConfig::from_path(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => GameConfig::builtin().context("bundled configuration is invalid")?,
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    let resolved = config.resolve().context("configuration rejected")?;
    info!("running {:.1}s with seed {}", cli.seconds, resolved.seed);

    let mut session = Session::new(World::new(resolved));
    let stats = session.run(duration, Duration::from_millis(cli.dt_ms));

    if cli.json {
        println!("{}", serde_json::to_string_pretty(stats)?);
    } else {
        println!("survived      {:.1}s", stats.survival_seconds);
        println!("game over     {}", stats.game_over);
        println!("level         {}", stats.level);
        println!("experience    {:.1}", stats.experience);
        println!(
            "kills         {} ({} bosses)",
            stats.hostiles_killed, stats.bosses_killed
        );
        println!(
            "spawned       {} (peak {}, rejected {})",
            stats.hostiles_spawned, stats.peak_live_hostiles, stats.spawns_rejected
        );
        println!(
            "projectiles   {} fired, {} hits, {} critical",
            stats.projectiles_fired, stats.projectile_hits, stats.critical_hits
        );
        println!(
            "damage        {:.0} dealt, {:.0} taken",
            stats.damage_dealt, stats.damage_taken
        );
        println!(
            "gold          {} collected of {} dropped",
            stats.gold_collected, stats.gold_dropped
        );
    }
    Ok(())
}
