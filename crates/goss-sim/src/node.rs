//! Gossiping peers.

use crate::link::LinkId;
use crate::state::{Color, State};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum neighbors contacted per round unless configured otherwise
pub const DEFAULT_FANOUT: usize = 100;

/// Index of a node in its topology's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// A peer holding one versioned [`State`] and a list of outgoing links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    state: State,
    neighbors: Vec<LinkId>,
    fanout: usize,
}

impl Node {
    pub fn new(id: NodeId, state: State) -> Self {
        Self {
            id,
            state,
            neighbors: Vec::new(),
            fanout: DEFAULT_FANOUT,
        }
    }

    pub fn with_fanout(mut self, fanout: usize) -> Self {
        self.fanout = fanout;
        self
    }

    /// Append an outgoing link. Its source must be this node.
    pub fn connect(&mut self, link: LinkId) {
        self.neighbors.push(link);
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn version(&self) -> u64 {
        self.state.version
    }

    pub fn payload(&self) -> Color {
        self.state.payload
    }

    pub fn neighbors(&self) -> &[LinkId] {
        &self.neighbors
    }

    pub fn fanout(&self) -> usize {
        self.fanout
    }

    /// Anti-entropy merge: adopt `incoming` only if its version is strictly
    /// greater. Returns whether the state changed.
    pub fn merge(&mut self, incoming: State) -> bool {
        if !incoming.supersedes(&self.state) {
            return false;
        }
        self.state = incoming;
        true
    }

    /// Links to push through this round.
    ///
    /// With `fanout` at least the neighbor count every link is returned once,
    /// in order. Otherwise `fanout` independent uniform draws are made with
    /// replacement, so the same link may appear more than once.
    pub fn select_links<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<LinkId> {
        let count = self.neighbors.len();
        if self.fanout >= count {
            return self.neighbors.clone();
        }
        (0..self.fanout)
            .map(|_| self.neighbors[rng.gen_range(0..count)])
            .collect()
    }

    /// Bump the version and install a fresh payload.
    pub(crate) fn reseed(&mut self, payload: Color) {
        self.state = State::new(self.state.version + 1, payload);
    }
}
