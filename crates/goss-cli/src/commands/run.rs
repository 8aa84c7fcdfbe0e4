//! `goss run`: tick one topology and summarise it.

use super::RunSummary;
use crate::config::Overrides;
use anyhow::Result;
use clap::Args;
use goss_sim::{Simulation, SimulationConfig, Strategy};
use std::time::Duration;
use tokio::time::MissedTickBehavior;

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Topology strategy: log, single or log-bounded
    #[arg(long)]
    pub strategy: Option<Strategy>,

    /// Number of ticks to run
    #[arg(short, long, default_value = "1000")]
    pub ticks: u64,

    /// Pace ticks in wall-clock time at the tick interval
    #[arg(long)]
    pub realtime: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub overrides: Overrides,
}

pub async fn run(base: &SimulationConfig, args: RunArgs) -> Result<()> {
    let mut config = args.overrides.apply(base);
    if let Some(strategy) = args.strategy {
        config.strategy = strategy;
    }

    let mut sim = Simulation::from_config(&config)?;
    tracing::info!(
        strategy = %config.strategy,
        nodes = config.node_count,
        links = sim.links().len(),
        ticks = args.ticks,
        "Starting simulation"
    );

    if args.realtime {
        let mut interval = tokio::time::interval(Duration::from_millis(config.tick_interval_ms));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        for _ in 0..args.ticks {
            interval.tick().await;
            log_convergence(&mut sim);
        }
    } else {
        for _ in 0..args.ticks {
            log_convergence(&mut sim);
        }
    }

    let summary = RunSummary::from_simulation(&config, &sim);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn log_convergence(sim: &mut Simulation) {
    let report = sim.tick();
    if report.converged {
        tracing::info!(
            tick = report.tick,
            now = %report.now,
            next_version = report.seed_version,
            "Converged"
        );
    }
}

fn print_summary(summary: &RunSummary) {
    println!("Strategy:        {}", summary.strategy);
    println!("Nodes / links:   {} / {}", summary.nodes, summary.links);
    println!(
        "Ticks:           {} ({}ms virtual)",
        summary.ticks, summary.virtual_ms
    );
    println!("Convergences:    {}", summary.convergences);
    println!("Mean ticks:      {}", summary.mean_display());
    println!(
        "Sends:           {} attempted, {} dropped, {} delivered, {} adopted",
        summary.attempts, summary.dropped, summary.delivered, summary.adopted
    );
}
