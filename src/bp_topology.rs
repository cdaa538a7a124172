//! Random Peer Topology
//!
//! Builds a directed peer graph in two passes. The first pass creates every
//! node and draws its peer indices; the second (`Network::materialize`)
//! resolves those indices into slots of the network collection, which is only
//! possible once all nodes exist.

use log::info;
use rand::seq::index;
use rand::Rng;

use crate::bp_interface::{Bandwidth, ConfigError, NodeIndex, SUPER_NODE_INDEX};
use crate::bp_node::Node;

// ============================================================================
// Configuration
// ============================================================================

/// Shape of the random peer graph
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// Number of ordinary nodes (default: 10,000)
    pub node_count: usize,

    /// Inclusive inbound degree range (default: 2..=2)
    pub inbound: (usize, usize),

    /// Inclusive outbound degree range (default: 4..=8)
    pub outbound: (usize, usize),

    /// Inclusive per-node bandwidth range, units/s (default: 200..=800)
    pub bandwidth: (Bandwidth, Bandwidth),
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            node_count: 10_000,
            inbound: (2, 2),
            outbound: (4, 8),
            bandwidth: (200, 800),
        }
    }
}

impl TopologyConfig {
    /// Smallest network that can satisfy the configured degrees.
    ///
    /// Inbound and outbound picks share one exclusion set with the node itself,
    /// so `max_in + max_out + 1` distinct indices must exist.
    pub fn required_node_count(&self) -> usize {
        let largest_bound = self.inbound.1.max(self.outbound.1);
        (self.inbound.1 + self.outbound.1 + 1).max(largest_bound + 2)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node_count == 0 {
            return Err(ConfigError::EmptyNetwork);
        }

        for (min, max) in [self.inbound, self.outbound] {
            if min > max {
                return Err(ConfigError::InvalidDegreeRange { min, max });
            }
        }

        let (min_bw, max_bw) = self.bandwidth;
        if min_bw == 0 || min_bw > max_bw {
            return Err(ConfigError::InvalidBandwidthRange {
                min: min_bw,
                max: max_bw,
            });
        }

        let required = self.required_node_count();
        if self.node_count < required {
            return Err(ConfigError::NodeCountTooSmall {
                node_count: self.node_count,
                required,
            });
        }

        Ok(())
    }
}

// ============================================================================
// Network
// ============================================================================

/// Owned collection of nodes addressed by index.
///
/// Ordinary nodes live at slot == index. A wired super-node sits in the slot
/// right after them and carries `SUPER_NODE_INDEX`.
#[derive(Debug, Clone, Default)]
pub struct Network {
    nodes: Vec<Node>,
    super_slot: Option<usize>,
}

impl Network {
    /// Wrap nodes whose index equals their position. Call `materialize` before use.
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            super_slot: None,
        }
    }

    /// Number of ordinary nodes
    pub fn node_count(&self) -> usize {
        match self.super_slot {
            Some(_) => self.nodes.len() - 1,
            None => self.nodes.len(),
        }
    }

    /// Number of nodes including the super-node
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn has_super_node(&self) -> bool {
        self.super_slot.is_some()
    }

    pub fn super_slot(&self) -> Option<usize> {
        self.super_slot
    }

    pub fn super_node(&self) -> Option<&Node> {
        self.super_slot.map(|slot| &self.nodes[slot])
    }

    pub fn slot_of(&self, index: NodeIndex) -> Option<usize> {
        if index == SUPER_NODE_INDEX {
            self.super_slot
        } else if index < self.node_count() {
            Some(index)
        } else {
            None
        }
    }

    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.slot_of(index).map(|slot| &self.nodes[slot])
    }

    pub fn node_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        self.slot_of(index).map(move |slot| &mut self.nodes[slot])
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Ordinary nodes only
    pub fn ordinary_nodes(&self) -> &[Node] {
        &self.nodes[..self.node_count()]
    }

    pub(crate) fn slot(&self, slot: usize) -> &Node {
        &self.nodes[slot]
    }

    pub(crate) fn slot_mut(&mut self, slot: usize) -> &mut Node {
        &mut self.nodes[slot]
    }

    /// Add `node` as the relay super-node and return its slot
    pub(crate) fn attach_super_node(&mut self, node: Node) -> usize {
        debug_assert!(node.is_super_node());
        let slot = self.nodes.len();
        self.nodes.push(node);
        self.super_slot = Some(slot);
        slot
    }

    /// Add a directed edge by index, keeping the materialized slots in step
    pub fn connect(&mut self, from: NodeIndex, to: NodeIndex) -> Result<(), ConfigError> {
        let from_slot = self.slot_of(from).ok_or(ConfigError::UnknownNode(from))?;
        let to_slot = self.slot_of(to).ok_or(ConfigError::UnknownNode(to))?;

        let source = &mut self.nodes[from_slot];
        source.outbound_peer_indexes.push(to);
        source.outbound_peers.push(to_slot);

        let target = &mut self.nodes[to_slot];
        target.inbound_peer_indexes.push(from);
        target.inbound_peers.push(from_slot);

        Ok(())
    }

    /// Resolve every stored peer index into a slot of this collection
    pub fn materialize(&mut self) -> Result<(), ConfigError> {
        let mut resolved = Vec::with_capacity(self.nodes.len());

        for node in &self.nodes {
            let inbound = self.resolve(&node.inbound_peer_indexes)?;
            let outbound = self.resolve(&node.outbound_peer_indexes)?;
            resolved.push((inbound, outbound));
        }

        for (node, (inbound, outbound)) in self.nodes.iter_mut().zip(resolved) {
            node.inbound_peers = inbound;
            node.outbound_peers = outbound;
        }

        Ok(())
    }

    fn resolve(&self, indexes: &[NodeIndex]) -> Result<Vec<usize>, ConfigError> {
        indexes
            .iter()
            .map(|index| self.slot_of(*index).ok_or(ConfigError::UnknownNode(*index)))
            .collect()
    }

    /// Clear receive state of every node so the topology can host a new run
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            node.reset();
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

pub struct TopologyBuilder {
    config: TopologyConfig,
}

impl TopologyBuilder {
    pub fn new(config: TopologyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TopologyConfig {
        &self.config
    }

    /// Draw bandwidth and peer indices for the node at `index`
    pub fn new_node<R: Rng + ?Sized>(
        &self,
        index: NodeIndex,
        rng: &mut R,
    ) -> Result<Node, ConfigError> {
        let (min_bw, max_bw) = self.config.bandwidth;
        let mut node = Node::new(index, rng.gen_range(min_bw..=max_bw));

        let inbound_count = rng.gen_range(self.config.inbound.0..=self.config.inbound.1);
        let outbound_count = rng.gen_range(self.config.outbound.0..=self.config.outbound.1);

        let mut peers = sample_peers(
            rng,
            self.config.node_count,
            index,
            inbound_count + outbound_count,
        )?;

        node.outbound_peer_indexes = peers.split_off(inbound_count);
        node.inbound_peer_indexes = peers;

        Ok(node)
    }

    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Network, ConfigError> {
        let nodes = (0..self.config.node_count)
            .map(|index| self.new_node(index, rng))
            .collect::<Result<Vec<_>, _>>()?;

        let mut network = Network::from_nodes(nodes);
        network.materialize()?;

        let edges: usize = network
            .nodes()
            .iter()
            .map(|n| n.outbound_peer_indexes.len())
            .sum();
        info!(
            "Network built: {} nodes, {} outbound edges (avg {:.2} per node)",
            network.node_count(),
            edges,
            edges as f64 / network.node_count() as f64
        );

        Ok(network)
    }
}

/// Draw `amount` distinct indices from `[0, domain)` without `exclude`.
///
/// Sampling is without replacement over the domain minus the excluded index,
/// so it never retries; an exhausted domain is reported instead.
pub fn sample_peers<R: Rng + ?Sized>(
    rng: &mut R,
    domain: usize,
    exclude: NodeIndex,
    amount: usize,
) -> Result<Vec<NodeIndex>, ConfigError> {
    let available = if exclude < domain { domain - 1 } else { domain };
    if amount > available {
        return Err(ConfigError::NodeCountTooSmall {
            node_count: domain,
            required: amount + 1,
        });
    }

    Ok(index::sample(rng, available, amount)
        .into_iter()
        .map(|i| if exclude < domain && i >= exclude { i + 1 } else { i })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn small_config(node_count: usize) -> TopologyConfig {
        TopologyConfig {
            node_count,
            inbound: (1, 3),
            outbound: (2, 5),
            bandwidth: (200, 800),
        }
    }

    #[test]
    fn test_degree_bounds_and_no_self_loops() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = small_config(50);
        let network = TopologyBuilder::new(config.clone())
            .unwrap()
            .build(&mut rng)
            .unwrap();

        assert_eq!(network.node_count(), 50);
        for node in network.nodes() {
            let ins = node.inbound_peer_indexes.len();
            let outs = node.outbound_peer_indexes.len();
            assert!(config.inbound.0 <= ins && ins <= config.inbound.1);
            assert!(config.outbound.0 <= outs && outs <= config.outbound.1);
            assert!(!node.inbound_peer_indexes.contains(&node.index));
            assert!(!node.outbound_peer_indexes.contains(&node.index));
            assert!(node.bandwidth() >= 200 && node.bandwidth() <= 800);
        }
    }

    #[test]
    fn test_peer_lists_have_no_duplicates() {
        let mut rng = StdRng::seed_from_u64(11);
        let network = TopologyBuilder::new(small_config(20))
            .unwrap()
            .build(&mut rng)
            .unwrap();

        for node in network.nodes() {
            let all: Vec<_> = node
                .inbound_peer_indexes
                .iter()
                .chain(node.outbound_peer_indexes.iter())
                .collect();
            let unique: HashSet<_> = all.iter().collect();
            assert_eq!(all.len(), unique.len(), "node {} repeats a peer", node.index);
        }
    }

    #[test]
    fn test_materialized_slots_match_indexes() {
        let mut rng = StdRng::seed_from_u64(3);
        let network = TopologyBuilder::new(small_config(30))
            .unwrap()
            .build(&mut rng)
            .unwrap();

        for node in network.nodes() {
            let outbound: Vec<_> = node
                .outbound_slots()
                .iter()
                .map(|slot| network.slot(*slot).index)
                .collect();
            assert_eq!(outbound, node.outbound_peer_indexes);
            assert_eq!(node.inbound_slots().len(), node.inbound_peer_indexes.len());
        }
    }

    #[test]
    fn test_tightest_feasible_network() {
        // Every node must pick all other nodes
        let config = TopologyConfig {
            node_count: 5,
            inbound: (2, 2),
            outbound: (2, 2),
            bandwidth: (100, 100),
        };
        let mut rng = StdRng::seed_from_u64(1);
        let network = TopologyBuilder::new(config).unwrap().build(&mut rng).unwrap();

        for node in network.nodes() {
            let mut all: Vec<_> = node
                .inbound_peer_indexes
                .iter()
                .chain(node.outbound_peer_indexes.iter())
                .copied()
                .collect();
            all.sort();
            let expected: Vec<_> = (0..5).filter(|i| *i != node.index).collect();
            assert_eq!(all, expected);
        }
    }

    #[test]
    fn test_node_count_too_small_fails_fast() {
        let config = TopologyConfig {
            node_count: 10,
            inbound: (2, 2),
            outbound: (4, 8),
            bandwidth: (200, 800),
        };
        assert_eq!(
            TopologyBuilder::new(config).err(),
            Some(ConfigError::NodeCountTooSmall {
                node_count: 10,
                required: 11
            })
        );
    }

    #[test]
    fn test_invalid_ranges_rejected() {
        let mut config = small_config(50);
        config.outbound = (6, 2);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidDegreeRange { min: 6, max: 2 })
        );

        let mut config = small_config(50);
        config.bandwidth = (0, 100);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBandwidthRange { .. })
        ));

        let mut config = small_config(50);
        config.node_count = 0;
        assert_eq!(config.validate(), Err(ConfigError::EmptyNetwork));
    }

    #[test]
    fn test_required_node_count() {
        let config = TopologyConfig {
            node_count: 100,
            inbound: (0, 0),
            outbound: (4, 8),
            bandwidth: (1, 1),
        };
        // Largest bound plus one must be exceeded even with no inbound peers
        assert_eq!(config.required_node_count(), 10);
        assert_eq!(TopologyConfig::default().required_node_count(), 11);
    }

    #[test]
    fn test_sample_peers_exhausted_domain() {
        let mut rng = StdRng::seed_from_u64(5);
        assert!(sample_peers(&mut rng, 4, 0, 4).is_err());

        let picked = sample_peers(&mut rng, 4, 2, 3).unwrap();
        let mut sorted = picked.clone();
        sorted.sort();
        assert_eq!(sorted, vec![0, 1, 3]);
    }

    #[test]
    fn test_build_is_deterministic_for_seed() {
        let builder = TopologyBuilder::new(small_config(40)).unwrap();
        let a = builder.build(&mut StdRng::seed_from_u64(99)).unwrap();
        let b = builder.build(&mut StdRng::seed_from_u64(99)).unwrap();

        for (x, y) in a.nodes().iter().zip(b.nodes()) {
            assert_eq!(x.outbound_peer_indexes, y.outbound_peer_indexes);
            assert_eq!(x.bandwidth(), y.bandwidth());
        }
    }

    #[test]
    fn test_connect_and_unknown_node() {
        let mut network = Network::from_nodes((0..3).map(|i| Node::new(i, 100)).collect());
        network.materialize().unwrap();

        network.connect(0, 2).unwrap();
        assert_eq!(network.node(0).unwrap().outbound_slots(), &[2]);
        assert_eq!(network.node(2).unwrap().inbound_peer_indexes, vec![0]);

        assert_eq!(network.connect(0, 9), Err(ConfigError::UnknownNode(9)));
    }

    #[test]
    fn test_materialize_rejects_dangling_index() {
        let mut node = Node::new(0, 100);
        node.outbound_peer_indexes.push(4);
        let mut network = Network::from_nodes(vec![node, Node::new(1, 100)]);

        assert_eq!(network.materialize(), Err(ConfigError::UnknownNode(4)));
    }
}
