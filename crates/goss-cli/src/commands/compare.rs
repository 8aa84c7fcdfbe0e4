//! `goss compare`: every strategy under identical parameters.

use super::RunSummary;
use crate::config::Overrides;
use anyhow::Result;
use clap::Args;
use goss_sim::{Simulation, SimulationConfig, Strategy};

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    /// Number of ticks to run each topology
    #[arg(short, long, default_value = "1000")]
    pub ticks: u64,

    /// Print the summaries as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub overrides: Overrides,
}

pub fn run(base: &SimulationConfig, args: CompareArgs) -> Result<()> {
    let shared = args.overrides.apply(base);
    let summaries = compare(&shared, args.ticks)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!(
        "{:<12} {:>6} {:>12} {:>11} {:>10} {:>10}",
        "strategy", "links", "convergences", "mean ticks", "attempts", "dropped"
    );
    for summary in &summaries {
        println!(
            "{:<12} {:>6} {:>12} {:>11} {:>10} {:>10}",
            summary.strategy.name(),
            summary.links,
            summary.convergences,
            summary.mean_display(),
            summary.attempts,
            summary.dropped
        );
    }
    Ok(())
}

/// Run each strategy for `ticks` rounds with the rest of `shared` unchanged.
pub fn compare(shared: &SimulationConfig, ticks: u64) -> Result<Vec<RunSummary>> {
    Strategy::ALL
        .into_iter()
        .map(|strategy| {
            let config = shared.clone().with_strategy(strategy);
            let mut sim = Simulation::from_config(&config)?;
            for _ in 0..ticks {
                sim.tick();
            }
            tracing::debug!(
                strategy = %strategy,
                convergences = sim.stats().convergences(),
                "Finished comparison run"
            );
            Ok(RunSummary::from_simulation(&config, &sim))
        })
        .collect()
}
