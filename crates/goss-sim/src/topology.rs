//! Ring topologies.
//!
//! Nodes sit on a conceptual ring at positions `0..count`. A [`Strategy`]
//! decides which ring offsets each node gets a directed link to. Offsets are
//! taken modulo `count`, so small rings can produce self-links or parallel
//! links; these are kept as-is.

use crate::config::{DelayRange, SimulationConfig};
use crate::error::{GossipError, Result};
use crate::link::{Link, LinkId};
use crate::node::{Node, NodeId, DEFAULT_FANOUT};
use crate::state::State;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bound on the doubling offsets used by [`Strategy::RingLogBounded`]
const BOUNDED_OFFSET_LIMIT: usize = 8;

/// How out-links are wired around the ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Offsets 1, 2, 4, ... below `count`: logarithmic degree and diameter
    #[serde(rename = "log", alias = "ring-log")]
    RingLog,
    /// Offsets -1 and +1: a plain bidirectional ring
    #[serde(rename = "single", alias = "ring-single")]
    RingSingle,
    /// Offsets 1, 2, 4 regardless of `count`
    #[serde(
        rename = "log-bounded",
        alias = "ring-log-bounded",
        alias = "log up to 4"
    )]
    RingLogBounded,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [
        Strategy::RingLog,
        Strategy::RingSingle,
        Strategy::RingLogBounded,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::RingLog => "log",
            Strategy::RingSingle => "single",
            Strategy::RingLogBounded => "log-bounded",
        }
    }

    /// Ring offsets each node links to, in wiring order.
    pub fn offsets(&self, count: usize) -> Vec<isize> {
        match self {
            Strategy::RingLog => doubling_offsets(count),
            Strategy::RingSingle => vec![-1, 1],
            Strategy::RingLogBounded => doubling_offsets(BOUNDED_OFFSET_LIMIT),
        }
    }
}

fn doubling_offsets(limit: usize) -> Vec<isize> {
    std::iter::successors(Some(1usize), |j| j.checked_mul(2))
        .take_while(|j| *j < limit)
        .map(|j| j as isize)
        .collect()
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = GossipError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "log" | "ring-log" => Ok(Strategy::RingLog),
            "single" | "ring-single" => Ok(Strategy::RingSingle),
            "log-bounded" | "ring-log-bounded" | "log up to 4" => Ok(Strategy::RingLogBounded),
            _ => Err(GossipError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Nodes plus the links between them, owned by exactly one simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    nodes: Vec<Node>,
    links: Vec<Link>,
}

impl Topology {
    /// Assemble a topology by hand.
    ///
    /// Node ids must match their position, link ids likewise, every link
    /// endpoint must exist, and every neighbor a node lists must be a link
    /// sourced at that node.
    pub fn from_parts(nodes: Vec<Node>, links: Vec<Link>) -> Result<Self> {
        if nodes.is_empty() {
            return Err(GossipError::InvalidNodeCount(0));
        }
        for (index, node) in nodes.iter().enumerate() {
            if node.id() != NodeId(index) {
                return Err(GossipError::InvalidTopology(format!(
                    "{} stored at position {index}",
                    node.id()
                )));
            }
            for link_id in node.neighbors() {
                let link = links.get(link_id.0).ok_or_else(|| {
                    GossipError::InvalidTopology(format!("{} lists missing {link_id}", node.id()))
                })?;
                if link.source() != node.id() {
                    return Err(GossipError::InvalidTopology(format!(
                        "{} lists {link_id} whose source is {}",
                        node.id(),
                        link.source()
                    )));
                }
            }
        }
        for (index, link) in links.iter().enumerate() {
            if link.id() != LinkId(index) {
                return Err(GossipError::InvalidTopology(format!(
                    "{} stored at position {index}",
                    link.id()
                )));
            }
            if link.source().0 >= nodes.len() || link.target().0 >= nodes.len() {
                return Err(GossipError::InvalidTopology(format!(
                    "{} connects {} -> {} outside {} nodes",
                    link.id(),
                    link.source(),
                    link.target(),
                    nodes.len()
                )));
            }
        }
        Ok(Self { nodes, links })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn out_degree(&self, node: NodeId) -> usize {
        self.nodes.get(node.0).map_or(0, |n| n.neighbors().len())
    }

    pub fn into_parts(self) -> (Vec<Node>, Vec<Link>) {
        (self.nodes, self.links)
    }
}

/// Builds ring topologies for a strategy.
#[derive(Debug, Clone)]
pub struct TopologyBuilder {
    strategy: Strategy,
    delay: DelayRange,
    fanout: usize,
}

impl TopologyBuilder {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            delay: DelayRange::default(),
            fanout: DEFAULT_FANOUT,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.strategy)
            .with_delay(config.delay)
            .with_fanout(config.fanout)
    }

    pub fn with_delay(mut self, delay: DelayRange) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_fanout(mut self, fanout: usize) -> Self {
        self.fanout = fanout;
        self
    }

    /// Build `count` nodes with node 0 seeded, wired per the strategy.
    ///
    /// Link delays are drawn from `rng` once per link, in wiring order.
    pub fn build<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Result<Topology> {
        if count == 0 {
            return Err(GossipError::InvalidNodeCount(count));
        }
        self.delay.validate()?;

        let mut nodes: Vec<Node> = (0..count)
            .map(|i| {
                let state = if i == 0 {
                    State::seed()
                } else {
                    State::initial()
                };
                Node::new(NodeId(i), state).with_fanout(self.fanout)
            })
            .collect();

        let offsets = self.strategy.offsets(count);
        let mut links = Vec::with_capacity(count * offsets.len());
        let ring = count as isize;

        for node in nodes.iter_mut() {
            let source = node.id();
            for offset in &offsets {
                let target = NodeId((source.0 as isize + offset).rem_euclid(ring) as usize);
                let id = LinkId(links.len());
                links.push(Link::new(id, source, target, self.delay.sample(rng)));
                node.connect(id);
            }
        }

        tracing::debug!(
            strategy = %self.strategy,
            nodes = count,
            links = links.len(),
            "Built ring topology"
        );

        Ok(Topology { nodes, links })
    }
}

/// Build a topology with default delays and fan-out.
pub fn build(count: usize, strategy: Strategy) -> Result<Topology> {
    let mut rng = ChaCha8Rng::seed_from_u64(rand::random());
    TopologyBuilder::new(strategy).build(count, &mut rng)
}

/// Build the topology described by `config`, drawing delays from `rng`.
pub fn build_with<R: Rng + ?Sized>(config: &SimulationConfig, rng: &mut R) -> Result<Topology> {
    TopologyBuilder::from_config(config).build(config.node_count, rng)
}
