//! # Warden Sim
//!
//! Headless runner for guard scenarios.
//!
//! Loads a TOML scenario (first argument, default `warden.toml`), builds the
//! guard simulation and steps it at a fixed rate, running scheduled console
//! commands along the way. Set `RUST_LOG=warden=debug` for per-guard detail
//! and `WARDEN_LOG_JSON=1` for JSON log lines. `warden --init [path]` writes
//! the built-in demo scenario to disk.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod scenario;
mod world;

use anyhow::{Context, Result};
use scenario::{Scenario, SCENARIO_FILE};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use world::World;

/// Main entry point.
fn main() -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("warden=info".parse()?);
    if std::env::var_os("WARDEN_LOG_JSON").is_some() {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    info!("Warden sim starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    let first = args.next();
    if first.as_deref() == Some("--init") {
        let path = args.next().unwrap_or_else(|| SCENARIO_FILE.to_string());
        Scenario::default()
            .save_to(&path)
            .with_context(|| format!("failed to write {path}"))?;
        return Ok(());
    }

    let path = first.unwrap_or_else(|| SCENARIO_FILE.to_string());
    let scenario = Scenario::load_from(&path);
    let mut world = World::build(&scenario).context("failed to build scenario")?;

    let summary = world.run();
    info!(
        steps = summary.steps,
        seconds = world.sim().elapsed(),
        spotted = summary.spotted,
        lost = summary.lost,
        commands = summary.commands,
        console_lines = world.console().output().len(),
        target = ?world.target_position(),
        "run complete"
    );
    Ok(())
}
