//! CLI command implementations

pub mod compare;
pub mod run;

use goss_sim::{Simulation, SimulationConfig, Strategy};
use serde::Serialize;

/// Outcome of one simulation run, as printed or emitted as JSON
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub strategy: Strategy,
    pub nodes: usize,
    pub links: usize,
    pub ticks: u64,
    pub virtual_ms: u64,
    pub convergences: usize,
    pub mean_ticks_to_converge: Option<f64>,
    pub attempts: u64,
    pub dropped: u64,
    pub delivered: u64,
    pub adopted: u64,
}

impl RunSummary {
    pub fn from_simulation(config: &SimulationConfig, sim: &Simulation) -> Self {
        let stats = sim.stats();
        Self {
            strategy: config.strategy,
            nodes: sim.nodes().len(),
            links: sim.links().len(),
            ticks: stats.ticks,
            virtual_ms: sim.now().as_millis(),
            convergences: stats.convergences(),
            mean_ticks_to_converge: stats.mean_ticks_to_converge(),
            attempts: stats.attempts,
            dropped: stats.dropped,
            delivered: stats.delivered,
            adopted: stats.adopted,
        }
    }

    pub fn mean_display(&self) -> String {
        self.mean_ticks_to_converge
            .map_or_else(|| "-".to_string(), |mean| format!("{mean:.1}"))
    }
}
