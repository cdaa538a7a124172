use std::fmt;

// Nodes are addressed by their position in the network collection
pub type NodeIndex = usize;
pub type BlockHeight = u64;

/// Transfer capacity in size units per second
pub type Bandwidth = u64;

/// Simulated time in milliseconds
pub type SimTime = u64;

/// Sentinel index of the relay super-node. Never produced by peer sampling.
pub const SUPER_NODE_INDEX: NodeIndex = NodeIndex::MAX;

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Block {
    pub height: BlockHeight,
    pub size: u64,

    /// Propagation rounds elapsed since the origin produced the block
    pub hop_count: u64,
}

impl Block {
    pub fn new(height: BlockHeight, size: u64) -> Self {
        Self {
            height,
            size,
            hop_count: 0,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Errors raised while validating a configuration, before any simulation starts
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Network must contain at least one node
    EmptyNetwork,

    /// Degree range with min above max
    InvalidDegreeRange { min: usize, max: usize },

    /// Too few nodes to pick distinct peers without self-loops
    NodeCountTooSmall { node_count: usize, required: usize },

    /// Bandwidth range with min above max, or a zero bandwidth
    InvalidBandwidthRange { min: Bandwidth, max: Bandwidth },

    /// Adoption probability outside [0, 1]
    ProbabilityOutOfRange(f64),

    ZeroBlockSize,

    ZeroTickDuration,

    /// Blocks start at height 1; height 0 is "never received"
    ZeroBlockHeight,

    /// Index that does not refer to a node of the network
    UnknownNode(NodeIndex),

    /// The network already carries a super-node
    RelayHubAlreadyWired,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyNetwork => write!(f, "node count must be positive"),
            ConfigError::InvalidDegreeRange { min, max } => {
                write!(f, "invalid degree range: min {} > max {}", min, max)
            }
            ConfigError::NodeCountTooSmall {
                node_count,
                required,
            } => write!(
                f,
                "node count {} too small for configured degrees (need at least {})",
                node_count, required
            ),
            ConfigError::InvalidBandwidthRange { min, max } => {
                write!(f, "invalid bandwidth range: {}..={}", min, max)
            }
            ConfigError::ProbabilityOutOfRange(p) => {
                write!(f, "probability {} outside [0, 1]", p)
            }
            ConfigError::ZeroBlockSize => write!(f, "block size must be positive"),
            ConfigError::ZeroTickDuration => write!(f, "tick duration must be positive"),
            ConfigError::ZeroBlockHeight => write!(f, "block height must be positive"),
            ConfigError::UnknownNode(index) => write!(f, "unknown node index {}", index),
            ConfigError::RelayHubAlreadyWired => write!(f, "relay hub already wired"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Event Logging System
// ============================================================================

/// Events emitted by the propagation engines for debugging and analysis
#[derive(Debug, Clone)]
pub enum Event {
    /// Node offered the block by a source that already holds it
    Offered {
        source: NodeIndex,
        negotiated_bandwidth: Bandwidth,
    },
    /// Node began receiving the block
    TransferStarted {
        height: BlockHeight,
        active_bandwidth: Bandwidth,
    },
    /// Node holds the full block
    TransferCompleted {
        height: BlockHeight,
        hop_count: u64,
        elapsed: SimTime,
    },
    /// Block at or below the node's height was ignored
    DuplicateRejected {
        height: BlockHeight,
        height_reached: BlockHeight,
    },
}

/// Trait for consuming events from the propagation engines
pub trait EventSink {
    fn log(&mut self, tick: u64, node: NodeIndex, event: Event);
}

/// No-op event sink for production use (zero overhead)
pub struct NoOpSink;

impl EventSink for NoOpSink {
    #[inline(always)]
    fn log(&mut self, _tick: u64, _node: NodeIndex, _event: Event) {}
}

/// One-shot completion hook registered for a specific node.
///
/// Invoked by the engine exactly once, in the tick the node finishes
/// receiving the block.
pub trait BlockObserver {
    fn block_completed(&mut self, node: NodeIndex, block: &Block);
}

impl<F> BlockObserver for F
where
    F: FnMut(NodeIndex, &Block),
{
    fn block_completed(&mut self, node: NodeIndex, block: &Block) {
        self(node, block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_starts_at_zero_hops() {
        let block = Block::new(1, 32000);
        assert_eq!(block.height, 1);
        assert_eq!(block.size, 32000);
        assert_eq!(block.hop_count, 0);
    }

    #[test]
    fn test_closure_observer() {
        let mut seen = Vec::new();
        {
            let mut observer = |node: NodeIndex, block: &Block| seen.push((node, block.hop_count));
            let mut block = Block::new(1, 10);
            block.hop_count = 3;
            observer.block_completed(7, &block);
        }
        assert_eq!(seen, vec![(7, 3)]);
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::NodeCountTooSmall {
            node_count: 5,
            required: 11,
        };
        assert_eq!(
            err.to_string(),
            "node count 5 too small for configured degrees (need at least 11)"
        );
        assert_eq!(
            ConfigError::ProbabilityOutOfRange(1.5).to_string(),
            "probability 1.5 outside [0, 1]"
        );
    }
}
