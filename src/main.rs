//! Pokken controller driver CLI
//!
//! Plays a macro or draws an image on a Nintendo Switch through a Linux USB
//! gadget posing as a Pokken Tournament Pro Pad.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use pokken_driver::config::DriverConfig;

// CLI definitions
mod cli;
use cli::{Cli, Commands};

// Command handlers
mod commands;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config_path = cli.config.unwrap_or_else(DriverConfig::default_path);

    if let Commands::InitConfig { force } = cli.command {
        return commands::inspect::init_config(&config_path, force);
    }

    info!("Loading config from {:?}", config_path);
    let config = DriverConfig::load(&config_path)?;

    match cli.command {
        Commands::Run {
            device,
            dry_run,
            print,
            hex,
            max_ticks,
            exit_when_done,
        } => {
            let options = commands::run::RunOptions {
                device,
                dry_run,
                print,
                hex,
                max_ticks,
                exit_when_done,
            };
            commands::run::run(config, options).await
        }
        Commands::Preview { output } => commands::inspect::preview(&config, output.as_deref()),
        Commands::Dump { count, hex } => commands::inspect::dump(&config, count, hex),
        Commands::Check => commands::inspect::check(&config),
        Commands::InitConfig { .. } => Ok(()),
    }
}
