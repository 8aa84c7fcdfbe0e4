#![deny(clippy::dbg_macro)]
#![deny(clippy::todo)]
#![allow(missing_docs)]
//! # Goss Sim - epidemic dissemination over ring topologies
//!
//! An in-memory simulation of gossip propagation:
//! - [`Node`]s hold one versioned [`State`] and merge newer versions only
//! - [`Link`]s are directed channels with a fixed transit delay and a
//!   cooldown equal to that delay
//! - [`TopologyBuilder`] wires nodes on a ring per [`Strategy`]
//! - [`Simulation`] runs rounds, detects global agreement and reseeds
//!
//! ## Design Principles
//!
//! - **Arena ownership**: nodes and links live in vectors and refer to each
//!   other by [`NodeId`] / [`LinkId`]
//! - **Virtual time**: delayed deliveries wait in a [`DeliveryQueue`] keyed by
//!   due time; nothing sleeps
//! - **Reproducible**: every random draw comes from an injected RNG, so a
//!   fixed seed replays a run exactly
//!
//! ```rust
//! use goss_sim::{DelayRange, Simulation, SimulationConfig, Strategy};
//!
//! let config = SimulationConfig::default()
//!     .with_node_count(4)
//!     .with_strategy(Strategy::RingSingle)
//!     .with_delay(DelayRange::ZERO)
//!     .with_seed(1);
//! let mut sim = Simulation::from_config(&config)?;
//! let report = sim.run_until_converged(10).expect("ring converges");
//! assert!(report.tick <= 2);
//! # Ok::<(), goss_sim::GossipError>(())
//! ```

pub mod config;
pub mod error;
pub mod link;
pub mod node;
pub mod prelude;
pub mod schedule;
pub mod simulation;
pub mod state;
pub mod stats;
pub mod topology;

pub use config::{DelayRange, SimulationConfig};
pub use error::{GossipError, Result};
pub use link::{Delivery, Link, LinkId};
pub use node::{Node, NodeId, DEFAULT_FANOUT};
pub use schedule::{DeliveryQueue, PendingDelivery, SimTime};
pub use simulation::Simulation;
pub use state::{Color, State, DEFAULT_COLOR, SEED_COLOR};
pub use stats::{ConvergenceEpoch, SimulationStats, TickReport};
pub use topology::{build, build_with, Strategy, Topology, TopologyBuilder};
