//! Per-tick reports and cumulative counters.

use crate::schedule::SimTime;
use serde::Serialize;

/// What happened during one [`Simulation::tick`](crate::Simulation::tick)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// 1-based tick number
    pub tick: u64,
    /// Virtual time after the clock advanced
    pub now: SimTime,
    /// Sends attempted by gossiping nodes
    pub attempts: usize,
    /// Sends refused by a cooling-down link
    pub dropped: usize,
    /// Merges invoked, whether queued or immediate
    pub delivered: usize,
    /// Merges that changed the receiver's state
    pub adopted: usize,
    /// Every node held the seed node's payload at the end of the round
    pub converged: bool,
    /// Seed node's version after any reseed
    pub seed_version: u64,
}

/// One version's journey from seeding to full agreement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConvergenceEpoch {
    pub version: u64,
    /// Tick after which this version was the seed's (0 for the build-time seed)
    pub seeded_after_tick: u64,
    pub converged_at_tick: u64,
}

impl ConvergenceEpoch {
    pub fn ticks(&self) -> u64 {
        self.converged_at_tick - self.seeded_after_tick
    }
}

/// Running totals over a simulation's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationStats {
    pub ticks: u64,
    pub attempts: u64,
    pub dropped: u64,
    pub delivered: u64,
    pub adopted: u64,
    pub epochs: Vec<ConvergenceEpoch>,
}

impl SimulationStats {
    pub fn record(&mut self, report: &TickReport) {
        self.ticks = report.tick;
        self.attempts += report.attempts as u64;
        self.dropped += report.dropped as u64;
        self.delivered += report.delivered as u64;
        self.adopted += report.adopted as u64;
    }

    pub(crate) fn record_epoch(&mut self, epoch: ConvergenceEpoch) {
        self.epochs.push(epoch);
    }

    pub fn convergences(&self) -> usize {
        self.epochs.len()
    }

    /// Mean ticks from seeding to agreement, if anything converged.
    pub fn mean_ticks_to_converge(&self) -> Option<f64> {
        if self.epochs.is_empty() {
            return None;
        }
        let total: u64 = self.epochs.iter().map(ConvergenceEpoch::ticks).sum();
        Some(total as f64 / self.epochs.len() as f64)
    }

    /// Fraction of attempted sends refused by link cooldowns
    pub fn drop_rate(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.dropped as f64 / self.attempts as f64
    }
}
