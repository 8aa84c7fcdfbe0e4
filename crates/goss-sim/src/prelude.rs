//! Goss prelude.
//!
//! Curated re-exports for driving a simulation.

pub use crate::{
    build, DelayRange, GossipError, Simulation, SimulationConfig, SimulationStats, State,
    Strategy, TickReport, Topology, TopologyBuilder,
};
