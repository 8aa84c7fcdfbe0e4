//! Error types for topology construction and configuration.
//!
//! Gossip itself never fails: merges, sends and ticks are total. Errors only
//! arise when a caller asks for a topology or configuration that cannot exist.

/// Errors raised while building or configuring a simulation
#[derive(Debug, thiserror::Error)]
pub enum GossipError {
    #[error("Invalid node count: {0} (a topology needs at least one node)")]
    InvalidNodeCount(usize),

    #[error("Unknown topology strategy: {0}")]
    UnknownStrategy(String),

    #[error("Invalid delay range: {min_ms}..{max_ms} (min must not exceed max)")]
    InvalidDelayRange { min_ms: u64, max_ms: u64 },

    #[error("Invalid fan-out: {0} (must contact at least one neighbor)")]
    InvalidFanout(usize),

    #[error("Invalid tick interval: {0}ms (the clock must advance)")]
    InvalidTickInterval(u64),

    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    #[error("Configuration parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GossipError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_strategy_message_names_the_input() {
        let err = GossipError::UnknownStrategy("mesh".to_string());
        assert!(err.to_string().contains("mesh"));
    }

    #[test]
    fn delay_range_message_shows_bounds() {
        let err = GossipError::InvalidDelayRange {
            min_ms: 800,
            max_ms: 400,
        };
        let msg = format!("{err}");
        assert!(msg.contains("800..400"));
    }
}
