//! Headless driver for gossip simulations
//!
//! Builds ring topologies, ticks them and reports how quickly the population
//! agrees on each new version.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;

use commands::{
    compare::{self, CompareArgs},
    run::{self, RunArgs},
};

#[derive(Parser)]
#[command(name = "goss")]
#[command(about = "Goss - epidemic dissemination simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Simulation config file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one topology and summarise its convergence epochs
    Run(RunArgs),

    /// Run every strategy on the same parameters side by side
    Compare(CompareArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    let base = config::load_base(cli.config.as_deref())?;

    match cli.command {
        Commands::Run(args) => run::run(&base, args).await?,
        Commands::Compare(args) => compare::run(&base, args)?,
    }

    Ok(())
}
