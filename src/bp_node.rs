//! Node Receive State Machine
//!
//! A node downloads a block over several ticks at a bandwidth negotiated with
//! the peer that feeds it. Progress accumulates fractionally; the transfer
//! completes in the first tick where it reaches the block size.
//!
//! Progress is kept in milli-units (bandwidth in units/s times tick length in
//! ms), so a tick moving 25.6 units adds exactly 25600 and completion never
//! drifts by a tick from float rounding.

use crate::bp_interface::{Bandwidth, Block, BlockHeight, NodeIndex, SimTime, SUPER_NODE_INDEX};

const MILLIS_PER_SECOND: u64 = 1000;

/// Receive state of a node relative to one block height
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Has not started on this height
    Idle,
    /// Transfer in flight
    Receiving,
    /// Holds the block; terminal for this height
    Done,
}

/// Result of driving a node through one `receive` tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// Height at or below what the node already has (duplicate suppression)
    Rejected,
    /// Transfer started or continued but is not finished
    InProgress,
    /// Transfer finished in this tick
    Completed,
}

impl ReceiveOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, ReceiveOutcome::Completed)
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub index: NodeIndex,

    // Peer indices as drawn; informational for inbound
    pub inbound_peer_indexes: Vec<NodeIndex>,
    pub outbound_peer_indexes: Vec<NodeIndex>,

    // Slots into the network collection, filled by Network::materialize
    pub(crate) inbound_peers: Vec<usize>,
    pub(crate) outbound_peers: Vec<usize>,

    pub hub_adapted: bool,

    bandwidth: Bandwidth,
    active_bandwidth: Bandwidth,
    height_reached: BlockHeight,
    in_progress: bool,
    /// Milli-units received for the in-flight transfer
    progress: u64,
}

impl Node {
    pub fn new(index: NodeIndex, bandwidth: Bandwidth) -> Self {
        Self {
            index,
            inbound_peer_indexes: Vec::new(),
            outbound_peer_indexes: Vec::new(),
            inbound_peers: Vec::new(),
            outbound_peers: Vec::new(),
            hub_adapted: false,
            bandwidth,
            active_bandwidth: bandwidth,
            height_reached: 0,
            in_progress: false,
            progress: 0,
        }
    }

    pub fn is_super_node(&self) -> bool {
        self.index == SUPER_NODE_INDEX
    }

    pub fn bandwidth(&self) -> Bandwidth {
        self.bandwidth
    }

    pub fn active_bandwidth(&self) -> Bandwidth {
        self.active_bandwidth
    }

    pub fn height_reached(&self) -> BlockHeight {
        self.height_reached
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    /// Units received so far for the in-flight transfer
    pub fn progress(&self) -> f64 {
        self.progress as f64 / MILLIS_PER_SECOND as f64
    }

    /// Slots of the peers this node pushes to
    pub fn outbound_slots(&self) -> &[usize] {
        &self.outbound_peers
    }

    pub fn inbound_slots(&self) -> &[usize] {
        &self.inbound_peers
    }

    pub fn state(&self, height: BlockHeight) -> NodeState {
        if self.in_progress {
            NodeState::Receiving
        } else if self.height_reached >= height {
            NodeState::Done
        } else {
            NodeState::Idle
        }
    }

    /// Holds the full block at `height` and can act as a source
    pub fn is_done(&self, height: BlockHeight) -> bool {
        self.state(height) == NodeState::Done
    }

    /// Never started on `height`; may be offered the block
    pub fn is_idle(&self, height: BlockHeight) -> bool {
        self.state(height) == NodeState::Idle
    }

    /// Rate of a link between this node and a peer: the slower end wins
    pub fn negotiate(&self, peer_bandwidth: Bandwidth) -> Bandwidth {
        self.bandwidth.min(peer_bandwidth)
    }

    /// Marks the node as already holding `block` without any transfer (block origin)
    pub fn seed(&mut self, block: &Block) {
        self.height_reached = self.height_reached.max(block.height);
        self.in_progress = false;
        self.progress = 0;
        self.active_bandwidth = self.bandwidth;
    }

    /// Process `block` for one tick.
    ///
    /// `driving_peer_bandwidth` is the bandwidth of the source that offered the
    /// block; it only matters when the transfer starts. One tick of
    /// `tick_duration_ms` moves `active_bandwidth * tick_duration_ms / 1000` units.
    pub fn receive(
        &mut self,
        block: &Block,
        driving_peer_bandwidth: Option<Bandwidth>,
        tick_duration_ms: SimTime,
    ) -> ReceiveOutcome {
        if !self.in_progress {
            if block.height <= self.height_reached {
                return ReceiveOutcome::Rejected;
            }

            debug_assert_eq!(self.progress, 0);

            self.in_progress = true;
            self.height_reached = block.height;
            self.active_bandwidth = match driving_peer_bandwidth {
                Some(peer) => self.negotiate(peer),
                None => self.bandwidth,
            };
        } else if block.height != self.height_reached {
            // A transfer is only ever driven by the block it started on
            return ReceiveOutcome::Rejected;
        }

        self.progress = self
            .progress
            .saturating_add(self.active_bandwidth.saturating_mul(tick_duration_ms));

        if self.progress >= block.size.saturating_mul(MILLIS_PER_SECOND) {
            self.progress = 0;
            self.in_progress = false;
            self.active_bandwidth = self.bandwidth;
            return ReceiveOutcome::Completed;
        }

        ReceiveOutcome::InProgress
    }

    /// Unbounded-bandwidth acceptance used by the flood baseline
    pub fn accept_instant(&mut self, block: &Block) -> bool {
        if block.height <= self.height_reached {
            return false;
        }

        self.height_reached = block.height;
        true
    }

    /// Forget everything received, keeping topology and bandwidth
    pub fn reset(&mut self) {
        self.height_reached = 0;
        self.in_progress = false;
        self.progress = 0;
        self.active_bandwidth = self.bandwidth;
    }
}
