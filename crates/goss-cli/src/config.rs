//! Config file loading and command-line overrides.

use anyhow::{Context, Result};
use clap::Args;
use goss_sim::{DelayRange, SimulationConfig};
use std::path::Path;

/// Flags shared by every command. Anything left unset keeps the value from
/// the config file, or the built-in default.
#[derive(Args, Debug, Clone, Default)]
pub struct Overrides {
    /// Number of nodes in each ring
    #[arg(short = 'n', long)]
    pub nodes: Option<usize>,

    /// Maximum neighbors contacted per node per tick
    #[arg(long)]
    pub fanout: Option<usize>,

    /// Minimum link delay in milliseconds
    #[arg(long)]
    pub min_delay: Option<u64>,

    /// Maximum link delay in milliseconds (exclusive)
    #[arg(long)]
    pub max_delay: Option<u64>,

    /// Virtual milliseconds per tick
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// RNG seed for a reproducible run
    #[arg(short, long)]
    pub seed: Option<u64>,
}

impl Overrides {
    pub fn apply(&self, base: &SimulationConfig) -> SimulationConfig {
        let mut config = base.clone();
        if let Some(nodes) = self.nodes {
            config.node_count = nodes;
        }
        if let Some(fanout) = self.fanout {
            config.fanout = fanout;
        }
        if self.min_delay.is_some() || self.max_delay.is_some() {
            config.delay = DelayRange::new(
                self.min_delay.unwrap_or(config.delay.min_ms),
                self.max_delay.unwrap_or(config.delay.max_ms),
            );
        }
        if let Some(tick_ms) = self.tick_ms {
            config.tick_interval_ms = tick_ms;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        config
    }
}

/// Load the config file if one was given, otherwise the defaults.
pub fn load_base(path: Option<&Path>) -> Result<SimulationConfig> {
    match path {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(SimulationConfig::default()),
    }
}
