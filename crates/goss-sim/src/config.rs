//! Simulation configuration.
//!
//! Every field has a default, so a TOML file only needs the keys it changes:
//!
//! ```toml
//! node_count = 32
//! strategy = "single"
//! seed = 7
//!
//! [delay]
//! min_ms = 100
//! max_ms = 200
//! ```

use crate::error::{GossipError, Result};
use crate::node::DEFAULT_FANOUT;
use crate::topology::Strategy;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_NODE_COUNT: usize = 20;

/// One animation frame at 60Hz
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 16;

/// Half-open range `[min_ms, max_ms)` that link delays are drawn from.
///
/// A range with `min_ms == max_ms` always yields that exact value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const ZERO: DelayRange = DelayRange::fixed(0);

    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    pub const fn fixed(delay_ms: u64) -> Self {
        Self::new(delay_ms, delay_ms)
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        if self.max_ms <= self.min_ms {
            return self.min_ms;
        }
        rng.gen_range(self.min_ms..self.max_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_ms > self.max_ms {
            return Err(GossipError::InvalidDelayRange {
                min_ms: self.min_ms,
                max_ms: self.max_ms,
            });
        }
        Ok(())
    }
}

impl Default for DelayRange {
    fn default() -> Self {
        Self::new(400, 800)
    }
}

/// Parameters for one topology and the driver that runs it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of nodes in the ring
    pub node_count: usize,
    /// How links are wired between ring positions
    pub strategy: Strategy,
    /// Maximum neighbors contacted per node per tick
    pub fanout: usize,
    /// Range link delays are drawn from at build time
    pub delay: DelayRange,
    /// Virtual time that passes per tick
    pub tick_interval_ms: u64,
    /// Seed for topology delays, fan-out draws and reseed colours.
    /// `None` draws a fresh seed per run.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            node_count: DEFAULT_NODE_COUNT,
            strategy: Strategy::RingLog,
            fanout: DEFAULT_FANOUT,
            delay: DelayRange::default(),
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node_count(mut self, node_count: usize) -> Self {
        self.node_count = node_count;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_fanout(mut self, fanout: usize) -> Self {
        self.fanout = fanout;
        self
    }

    pub fn with_delay(mut self, delay: DelayRange) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_tick_interval_ms(mut self, tick_interval_ms: u64) -> Self {
        self.tick_interval_ms = tick_interval_ms;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check every field; the first violation wins.
    pub fn validate(&self) -> Result<()> {
        if self.node_count == 0 {
            return Err(GossipError::InvalidNodeCount(self.node_count));
        }
        if self.fanout == 0 {
            return Err(GossipError::InvalidFanout(self.fanout));
        }
        if self.tick_interval_ms == 0 {
            return Err(GossipError::InvalidTickInterval(self.tick_interval_ms));
        }
        self.delay.validate()
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    /// RNG for a run: seeded if `seed` is set, otherwise from a random seed.
    pub fn rng(&self) -> ChaCha8Rng {
        let seed = self.seed.unwrap_or_else(rand::random);
        ChaCha8Rng::seed_from_u64(seed)
    }
}
