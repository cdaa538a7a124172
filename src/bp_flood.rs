//! Instant-Hop Flood Baseline
//!
//! Ignores bandwidth entirely: every node that got the block in the previous
//! round pushes it to all outbound peers in the next one. Gives the lower
//! bound on hops that the timed engine is compared against.

use hashbrown::HashMap;
use log::{debug, info};
use rand::Rng;

use crate::bp_interface::{Block, BlockHeight, BlockObserver, ConfigError, NodeIndex};
use crate::bp_topology::Network;

#[derive(Debug, Clone, PartialEq)]
pub struct FloodResult {
    pub origin: NodeIndex,

    /// Rounds that delivered at least one new node
    pub hops: u64,

    /// Ordinary nodes holding the block, origin included
    pub reached: usize,

    pub unreached: usize,

    /// Newly reached ordinary nodes per round
    pub per_round: Vec<usize>,
}

pub struct FloodSimulator {
    network: Network,
    block_height: BlockHeight,
    observers: HashMap<usize, Box<dyn BlockObserver>>,
}

impl FloodSimulator {
    pub fn new(network: Network, block_height: BlockHeight) -> Result<Self, ConfigError> {
        if block_height == 0 {
            return Err(ConfigError::ZeroBlockHeight);
        }
        if network.node_count() == 0 {
            return Err(ConfigError::EmptyNetwork);
        }

        Ok(Self {
            network,
            block_height,
            observers: HashMap::new(),
        })
    }

    pub fn observe<O>(&mut self, index: NodeIndex, observer: O) -> Result<(), ConfigError>
    where
        O: BlockObserver + 'static,
    {
        let slot = self
            .network
            .slot_of(index)
            .ok_or(ConfigError::UnknownNode(index))?;
        self.observers.insert(slot, Box::new(observer));
        Ok(())
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn into_network(self) -> Network {
        self.network
    }

    pub fn run<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<FloodResult, ConfigError> {
        let origin = rng.gen_range(0..self.network.node_count());
        self.run_from(origin)
    }

    pub fn run_from(&mut self, origin: NodeIndex) -> Result<FloodResult, ConfigError> {
        let origin_slot = self
            .network
            .slot_of(origin)
            .filter(|slot| Some(*slot) != self.network.super_slot())
            .ok_or(ConfigError::UnknownNode(origin))?;

        self.network.reset();

        let super_slot = self.network.super_slot();
        let mut block = Block::new(self.block_height, 0);
        self.network.slot_mut(origin_slot).accept_instant(&block);

        let mut reached = 1;
        let mut per_round = Vec::new();
        let mut frontier = vec![origin_slot];

        while !frontier.is_empty() {
            block.hop_count += 1;

            let mut next = Vec::new();
            for slot in frontier {
                let peers = self.network.slot(slot).outbound_slots().to_vec();
                for peer_slot in peers {
                    let peer = self.network.slot_mut(peer_slot);
                    if !peer.accept_instant(&block) {
                        continue;
                    }

                    let index = peer.index;
                    if let Some(observer) = self.observers.get_mut(&peer_slot) {
                        observer.block_completed(index, &block);
                    }
                    next.push(peer_slot);
                }
            }

            let newly_reached = next.iter().filter(|slot| Some(**slot) != super_slot).count();
            if next.is_empty() {
                // Nothing moved this round
                block.hop_count -= 1;
            } else {
                reached += newly_reached;
                per_round.push(newly_reached);
                debug!(
                    "After {} propagation, {} nodes have received the block",
                    block.hop_count, reached
                );
            }

            frontier = next;
        }

        let result = FloodResult {
            origin,
            hops: block.hop_count,
            reached,
            unreached: self.network.node_count() - reached,
            per_round,
        };

        info!(
            "Flood finished after {} hops: {}/{} nodes reached",
            result.hops,
            result.reached,
            self.network.node_count()
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bp_interface::SUPER_NODE_INDEX;
    use crate::bp_node::Node;
    use crate::bp_relay_hub::{wire_relay_hub, RelayHubConfig};
    use crate::bp_topology::{TopologyBuilder, TopologyConfig};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::Cell;
    use std::rc::Rc;

    fn network(count: usize, edges: &[(usize, usize)]) -> Network {
        let mut nodes: Vec<Node> = (0..count).map(|i| Node::new(i, 100)).collect();
        for (from, to) in edges {
            nodes[*from].outbound_peer_indexes.push(*to);
        }
        let mut network = Network::from_nodes(nodes);
        network.materialize().unwrap();
        network
    }

    #[test]
    fn test_chain_hops() {
        let mut sim = FloodSimulator::new(network(4, &[(0, 1), (1, 2), (2, 3)]), 1).unwrap();

        let result = sim.run_from(0).unwrap();

        assert_eq!(result.hops, 3);
        assert_eq!(result.reached, 4);
        assert_eq!(result.per_round, vec![1, 1, 1]);
    }

    #[test]
    fn test_fan_out_and_duplicates() {
        // 0 reaches 1 and 2 in round one; both push to 3, which accepts once
        let mut sim =
            FloodSimulator::new(network(4, &[(0, 1), (0, 2), (1, 3), (2, 3), (3, 0)]), 1).unwrap();

        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        sim.observe(3, move |_: NodeIndex, b: &Block| {
            assert_eq!(b.hop_count, 2);
            counter.set(counter.get() + 1);
        })
        .unwrap();

        let result = sim.run_from(0).unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(result.hops, 2);
        assert_eq!(result.per_round, vec![2, 1]);
    }

    #[test]
    fn test_partition_reported_as_unreached() {
        let mut sim = FloodSimulator::new(network(5, &[(0, 1), (3, 4)]), 1).unwrap();

        let result = sim.run_from(0).unwrap();

        assert_eq!(result.reached, 2);
        assert_eq!(result.unreached, 3);
    }

    #[test]
    fn test_hub_shortcut_reduces_hops() {
        let mut plain = FloodSimulator::new(network(6, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)]), 1)
            .unwrap();
        assert_eq!(plain.run_from(0).unwrap().hops, 5);

        let mut hubbed = network(6, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)]);
        let config = RelayHubConfig {
            adoption_probability: 1.0,
            ..Default::default()
        };
        wire_relay_hub(&mut hubbed, &config, &mut StdRng::seed_from_u64(1)).unwrap();

        let mut sim = FloodSimulator::new(hubbed, 1).unwrap();
        let hub_hop = Rc::new(Cell::new(0));
        let seen = hub_hop.clone();
        sim.observe(SUPER_NODE_INDEX, move |_: NodeIndex, b: &Block| seen.set(b.hop_count))
            .unwrap();

        let result = sim.run_from(0).unwrap();

        assert_eq!(hub_hop.get(), 1);
        assert_eq!(result.hops, 2);
        assert_eq!(result.reached, 6);
    }

    #[test]
    fn test_random_network_reaches_most_nodes() {
        let config = TopologyConfig {
            node_count: 500,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(21);
        let network = TopologyBuilder::new(config).unwrap().build(&mut rng).unwrap();
        let mut sim = FloodSimulator::new(network, 1).unwrap();

        let result = sim.run(&mut rng).unwrap();

        assert_eq!(result.reached + result.unreached, 500);
        assert_eq!(result.per_round.len() as u64, result.hops);
        assert_eq!(result.per_round.iter().sum::<usize>() + 1, result.reached);
    }
}
