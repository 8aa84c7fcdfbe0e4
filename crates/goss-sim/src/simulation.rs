//! The round driver.
//!
//! A [`Simulation`] owns one topology, the virtual clock and the queue of
//! in-flight messages. Each [`tick`](Simulation::tick):
//!
//! 1. advances the clock by the tick interval,
//! 2. merges every queued message that is now due,
//! 3. asks each node, in id order, to gossip its current state,
//! 4. checks whether every node holds node 0's payload and, if so, gives
//!    node 0 a new version with a fresh colour.
//!
//! The driver never schedules its own ticks; something outside calls
//! `tick()` repeatedly.

use crate::config::{SimulationConfig, DEFAULT_TICK_INTERVAL_MS};
use crate::error::Result;
use crate::link::{Delivery, Link};
use crate::node::{Node, NodeId};
use crate::schedule::{DeliveryQueue, SimTime};
use crate::state::{Color, State};
use crate::stats::{ConvergenceEpoch, SimulationStats, TickReport};
use crate::topology::{self, Topology};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

/// Drives gossip rounds over one topology.
#[derive(Debug)]
pub struct Simulation<R = ChaCha8Rng> {
    nodes: Vec<Node>,
    links: Vec<Link>,
    queue: DeliveryQueue,
    rng: R,
    now: SimTime,
    tick_interval_ms: u64,
    tick: u64,
    epoch_seeded_after: u64,
    stats: SimulationStats,
}

impl Simulation<ChaCha8Rng> {
    /// Drive `topology` with a randomly seeded RNG and the default tick
    /// interval.
    pub fn new(topology: Topology) -> Self {
        Self::with_rng(topology, ChaCha8Rng::seed_from_u64(rand::random()))
    }

    /// Validate `config`, build its topology and wrap it in a driver.
    ///
    /// One RNG stream, seeded from the config, feeds both link delays and
    /// the run itself, so a fixed seed reproduces a run exactly.
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = config.rng();
        let topology = topology::build_with(config, &mut rng)?;
        Ok(Self::with_rng(topology, rng).with_tick_interval_ms(config.tick_interval_ms))
    }
}

impl<R: Rng> Simulation<R> {
    pub fn with_rng(topology: Topology, rng: R) -> Self {
        let (nodes, links) = topology.into_parts();
        Self {
            nodes,
            links,
            queue: DeliveryQueue::new(),
            rng,
            now: SimTime::ZERO,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            tick: 0,
            epoch_seeded_after: 0,
            stats: SimulationStats::default(),
        }
    }

    /// Virtual time added per tick. A zero interval freezes the clock, so
    /// queued deliveries never land.
    pub fn with_tick_interval_ms(mut self, tick_interval_ms: u64) -> Self {
        self.tick_interval_ms = tick_interval_ms;
        self
    }

    /// Run one gossip round.
    pub fn tick(&mut self) -> TickReport {
        self.tick += 1;
        self.now = self.now.saturating_add_millis(self.tick_interval_ms);

        let mut report = TickReport {
            tick: self.tick,
            now: self.now,
            ..TickReport::default()
        };

        while let Some(pending) = self.queue.pop_due(self.now) {
            self.land(pending.target, pending.message, &mut report);
        }

        for index in 0..self.nodes.len() {
            self.gossip_from(index, &mut report);
        }

        if self.is_converged() {
            report.converged = true;
            self.reseed();
        }

        report.seed_version = self.nodes.first().map_or(0, Node::version);
        self.stats.record(&report);
        report
    }

    /// Tick until a round ends converged or `max_ticks` rounds have run.
    ///
    /// Returns the converged round's report, or `None` if the budget ran out.
    pub fn run_until_converged(&mut self, max_ticks: u64) -> Option<TickReport> {
        (0..max_ticks)
            .map(|_| self.tick())
            .find(|report| report.converged)
    }

    /// Whether every node currently holds node 0's payload.
    pub fn is_converged(&self) -> bool {
        match self.nodes.split_first() {
            Some((seed, rest)) => rest.iter().all(|node| node.payload() == seed.payload()),
            None => false,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms
    }

    pub fn pending_deliveries(&self) -> usize {
        self.queue.len()
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    /// Push node `index`'s current state through the links it selects.
    fn gossip_from(&mut self, index: usize, report: &mut TickReport) {
        let node = &self.nodes[index];
        let message = *node.state();
        let selected = node.select_links(&mut self.rng);

        for link_id in selected {
            report.attempts += 1;
            let Some(link) = self.links.get_mut(link_id.0) else {
                continue;
            };
            match link.deliver(self.now, message, &mut self.queue) {
                Delivery::Dropped { .. } => report.dropped += 1,
                Delivery::Immediate { target, message } => self.land(target, message, report),
                Delivery::Scheduled { at } => {
                    trace!(link = %link_id, at = %at, version = message.version, "Scheduled delivery");
                }
            }
        }
    }

    fn land(&mut self, target: NodeId, message: State, report: &mut TickReport) {
        let Some(node) = self.nodes.get_mut(target.0) else {
            return;
        };
        report.delivered += 1;
        if node.merge(message) {
            report.adopted += 1;
            trace!(node = %target, version = message.version, "Adopted newer state");
        }
    }

    /// Start a new epoch at node 0 with a colour nobody currently holds.
    fn reseed(&mut self) {
        let Some(seed) = self.nodes.first_mut() else {
            return;
        };
        let converged_version = seed.version();
        let payload = Color::random_hue_except(&mut self.rng, &seed.payload());
        seed.reseed(payload);

        self.stats.record_epoch(ConvergenceEpoch {
            version: converged_version,
            seeded_after_tick: self.epoch_seeded_after,
            converged_at_tick: self.tick,
        });
        self.epoch_seeded_after = self.tick;

        debug!(
            tick = self.tick,
            now = %self.now,
            converged_version,
            next_version = seed.version(),
            payload = %payload,
            "Population converged; reseeding"
        );
    }
}
