//! End-to-end propagation scenarios over built topologies.

use goss_sim::{
    DelayRange, GossipError, NodeId, Simulation, SimulationConfig, Strategy, TopologyBuilder,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// Helpers
// ============================================================================

fn config(strategy: Strategy, seed: u64) -> SimulationConfig {
    SimulationConfig::default()
        .with_strategy(strategy)
        .with_seed(seed)
}

fn versions(sim: &Simulation) -> Vec<u64> {
    sim.nodes().iter().map(|n| n.version()).collect()
}

// ============================================================================
// Convergence
// ============================================================================

#[test]
fn every_strategy_converges_with_reference_delays() {
    for strategy in Strategy::ALL {
        let mut sim = Simulation::from_config(&config(strategy, 17)).unwrap();

        let report = sim.run_until_converged(5_000);
        assert!(report.is_some(), "{strategy} never converged");
    }
}

#[test]
fn four_ring_zero_delay_agrees_on_seed_version() {
    let config = config(Strategy::RingSingle, 4)
        .with_node_count(4)
        .with_delay(DelayRange::ZERO);
    let mut sim = Simulation::from_config(&config).unwrap();

    let first = sim.tick();
    let second = sim.tick();
    assert!(first.converged || second.converged);

    // Node 0 has moved on; every other node holds at least version 1.
    assert!(sim.nodes()[1..].iter().all(|n| n.version() >= 1));
}

#[test]
fn reseed_breaks_agreement_until_it_propagates() {
    let config = config(Strategy::RingSingle, 5)
        .with_node_count(6)
        .with_delay(DelayRange::fixed(48));
    let mut sim = Simulation::from_config(&config).unwrap();

    let report = sim.run_until_converged(1_000).unwrap();
    assert!(!sim.is_converged());
    assert_eq!(report.seed_version, 2);
    assert_eq!(sim.node(NodeId(0)).unwrap().version(), 2);
    assert!(sim.nodes()[1..].iter().all(|n| n.version() == 1));

    let next = sim.run_until_converged(1_000).unwrap();
    assert!(next.tick > report.tick);
    assert_eq!(next.seed_version, 3);
}

#[test]
fn logarithmic_ring_beats_single_ring() {
    let ticks = 4_000;
    let mut log = Simulation::from_config(&config(Strategy::RingLog, 21)).unwrap();
    let mut single = Simulation::from_config(&config(Strategy::RingSingle, 21)).unwrap();
    for _ in 0..ticks {
        log.tick();
        single.tick();
    }

    let log_mean = log.stats().mean_ticks_to_converge().unwrap();
    let single_mean = single.stats().mean_ticks_to_converge().unwrap();
    assert!(
        log_mean < single_mean,
        "log ring ({log_mean:.1}) should converge faster than single ring ({single_mean:.1})"
    );
}

// ============================================================================
// Invariants over a long run
// ============================================================================

#[test]
fn versions_are_monotone_across_ticks() {
    let mut sim = Simulation::from_config(&config(Strategy::RingLogBounded, 8)).unwrap();
    let mut previous = versions(&sim);

    for _ in 0..2_000 {
        sim.tick();
        let current = versions(&sim);
        for (before, after) in previous.iter().zip(&current) {
            assert!(after >= before);
        }
        previous = current;
    }
}

#[test]
fn no_node_runs_ahead_of_the_seed() {
    let mut sim = Simulation::from_config(&config(Strategy::RingLog, 12)).unwrap();
    for _ in 0..1_500 {
        sim.tick();
        let seed = sim.nodes()[0].version();
        assert!(sim.nodes().iter().all(|n| n.version() <= seed));
    }
}

#[test]
fn counters_balance() {
    let mut sim = Simulation::from_config(&config(Strategy::RingSingle, 2)).unwrap();
    for _ in 0..800 {
        sim.tick();
    }

    let stats = sim.stats();
    let accepted = stats.attempts - stats.dropped;
    assert!(stats.dropped > 0, "cooldowns should refuse some sends");
    assert_eq!(accepted, stats.delivered + sim.pending_deliveries() as u64);
    assert!(stats.adopted <= stats.delivered);
}

#[test]
fn fixed_seed_replays_identically() {
    let run = |seed| {
        let mut sim = Simulation::from_config(&config(Strategy::RingLogBounded, seed)).unwrap();
        for _ in 0..1_000 {
            sim.tick();
        }
        (sim.stats().clone(), versions(&sim))
    };

    assert_eq!(run(33), run(33));
}

// ============================================================================
// Fan-out
// ============================================================================

#[test]
fn limited_fanout_caps_attempts_per_node() {
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let topology = TopologyBuilder::new(Strategy::RingLog)
        .with_fanout(2)
        .with_delay(DelayRange::ZERO)
        .build(20, &mut rng)
        .unwrap();
    let mut sim = Simulation::with_rng(topology, rng);

    let report = sim.tick();
    assert_eq!(report.attempts, 20 * 2);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn empty_topology_is_invalid() {
    let result = Simulation::from_config(&SimulationConfig::default().with_node_count(0));
    assert!(matches!(result, Err(GossipError::InvalidNodeCount(0))));
}
