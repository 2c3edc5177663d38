mod cli;
mod config;
mod error;
mod game_launcher;
#[cfg(feature = "gui")]
mod gui;
mod installer;
mod library;
mod minecraft;
#[cfg(feature = "gui")]
mod particles;
mod runtime;
mod settings;
mod status;
mod tasks;
mod utils;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

// The installer drives its downloads on a runtime owned by its worker thread,
// so main stays synchronous.
fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = config::Config::load(cli.config.as_deref())?.apply(&cli.overrides());
    tracing::debug!("Game directory: {}", config.game.directory.display());

    cli.execute(config)
}
