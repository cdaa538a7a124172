//! Relay Hub Wiring
//!
//! Models a dedicated relay network as a single high-bandwidth super-node.
//! Each ordinary node independently adopts the hub with a fixed probability
//! and gets a two-way edge to it.

use log::info;
use rand::Rng;

use crate::bp_interface::{Bandwidth, ConfigError, SUPER_NODE_INDEX};
use crate::bp_node::Node;
use crate::bp_topology::Network;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RelayHubConfig {
    /// Chance that an ordinary node connects to the hub (default: 0.2)
    pub adoption_probability: f64,

    /// Super-node bandwidth, units/s (default: 1,000,000)
    pub bandwidth: Bandwidth,
}

impl Default for RelayHubConfig {
    fn default() -> Self {
        Self {
            adoption_probability: 0.2,
            bandwidth: 1_000_000,
        }
    }
}

impl RelayHubConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = self.adoption_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(ConfigError::ProbabilityOutOfRange(p));
        }
        if self.bandwidth == 0 {
            return Err(ConfigError::InvalidBandwidthRange { min: 0, max: 0 });
        }
        Ok(())
    }
}

/// Attach a super-node to `network` and wire adopting nodes to it.
///
/// Returns the number of hub-adapted nodes. The super-node only ever joins
/// the graph through these edges; peer sampling never picks it. A network
/// carries at most one hub, so wiring twice is an error.
pub fn wire_relay_hub<R: Rng + ?Sized>(
    network: &mut Network,
    config: &RelayHubConfig,
    rng: &mut R,
) -> Result<usize, ConfigError> {
    config.validate()?;

    if network.has_super_node() {
        return Err(ConfigError::RelayHubAlreadyWired);
    }

    network.attach_super_node(Node::new(SUPER_NODE_INDEX, config.bandwidth));

    let mut adapted = 0;
    for slot in 0..network.node_count() {
        let draw: f64 = rng.gen_range(0.0..=1.0);
        if draw > config.adoption_probability {
            continue;
        }

        let node = network.slot_mut(slot);
        node.hub_adapted = true;
        let index = node.index;

        network.connect(index, SUPER_NODE_INDEX)?;
        network.connect(SUPER_NODE_INDEX, index)?;

        adapted += 1;
    }

    info!(
        "Relay hub wired: {} of {} nodes adapted (p={})",
        adapted,
        network.node_count(),
        config.adoption_probability
    );

    Ok(adapted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bp_topology::{TopologyBuilder, TopologyConfig};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn network(seed: u64) -> Network {
        let config = TopologyConfig {
            node_count: 40,
            inbound: (2, 2),
            outbound: (2, 4),
            bandwidth: (500, 500),
        };
        TopologyBuilder::new(config)
            .unwrap()
            .build(&mut StdRng::seed_from_u64(seed))
            .unwrap()
    }

    #[test]
    fn test_full_adoption_wires_every_node() {
        let mut network = network(1);
        let config = RelayHubConfig {
            adoption_probability: 1.0,
            ..Default::default()
        };

        let adapted = wire_relay_hub(&mut network, &config, &mut StdRng::seed_from_u64(2)).unwrap();
        assert_eq!(adapted, 40);

        let hub = network.super_node().unwrap();
        assert!(hub.is_super_node());
        assert_eq!(hub.bandwidth(), 1_000_000);

        for node in network.ordinary_nodes() {
            assert!(node.hub_adapted);
            assert!(node.outbound_peer_indexes.contains(&SUPER_NODE_INDEX));
            assert!(hub.outbound_peer_indexes.contains(&node.index));
        }
        assert_eq!(hub.outbound_peer_indexes.len(), 40);
    }

    #[test]
    fn test_zero_adoption_wires_nothing() {
        let mut network = network(3);
        let config = RelayHubConfig {
            adoption_probability: 0.0,
            ..Default::default()
        };

        let adapted = wire_relay_hub(&mut network, &config, &mut StdRng::seed_from_u64(4)).unwrap();
        assert_eq!(adapted, 0);
        assert!(network.super_node().unwrap().outbound_peer_indexes.is_empty());
        assert!(network.ordinary_nodes().iter().all(|n| !n.hub_adapted));
    }

    #[test]
    fn test_super_node_addressable_by_sentinel() {
        let mut network = network(5);
        wire_relay_hub(&mut network, &RelayHubConfig::default(), &mut StdRng::seed_from_u64(6)).unwrap();

        assert_eq!(network.node_count(), 40);
        assert_eq!(network.len(), 41);
        assert_eq!(network.slot_of(SUPER_NODE_INDEX), Some(40));
        assert!(network.node(SUPER_NODE_INDEX).unwrap().is_super_node());
        assert!(network.node(40).is_none());
    }

    #[test]
    fn test_edges_are_symmetric() {
        let mut network = network(8);
        let config = RelayHubConfig {
            adoption_probability: 0.5,
            ..Default::default()
        };
        wire_relay_hub(&mut network, &config, &mut StdRng::seed_from_u64(9)).unwrap();

        let hub = network.super_node().unwrap();
        for node in network.ordinary_nodes() {
            let to_hub = node.outbound_peer_indexes.contains(&SUPER_NODE_INDEX);
            let from_hub = hub.outbound_peer_indexes.contains(&node.index);
            assert_eq!(to_hub, node.hub_adapted);
            assert_eq!(from_hub, node.hub_adapted);
        }
    }

    #[test]
    fn test_hub_edges_recorded_on_both_ends() {
        let mut network = network(11);
        let config = RelayHubConfig {
            adoption_probability: 0.5,
            ..Default::default()
        };
        let adapted = wire_relay_hub(&mut network, &config, &mut StdRng::seed_from_u64(12)).unwrap();

        let hub_slot = network.super_slot().unwrap();
        let hub = network.super_node().unwrap();
        assert_eq!(hub.inbound_peer_indexes.len(), adapted);
        assert_eq!(hub.inbound_slots().len(), adapted);
        assert_eq!(hub.outbound_slots().len(), adapted);

        for node in network.ordinary_nodes() {
            let from_hub = node.inbound_peer_indexes.contains(&SUPER_NODE_INDEX);
            assert_eq!(from_hub, node.hub_adapted);
            assert_eq!(node.inbound_slots().contains(&hub_slot), node.hub_adapted);
            assert_eq!(hub.inbound_peer_indexes.contains(&node.index), node.hub_adapted);
        }
    }

    #[test]
    fn test_second_hub_rejected() {
        let mut network = network(13);
        let mut rng = StdRng::seed_from_u64(14);
        wire_relay_hub(&mut network, &RelayHubConfig::default(), &mut rng).unwrap();
        let edges_before: usize = network.nodes().iter().map(|n| n.outbound_peer_indexes.len()).sum();

        let config = RelayHubConfig {
            adoption_probability: 1.0,
            bandwidth: 5,
        };
        assert_eq!(
            wire_relay_hub(&mut network, &config, &mut rng),
            Err(ConfigError::RelayHubAlreadyWired)
        );

        let edges_after: usize = network.nodes().iter().map(|n| n.outbound_peer_indexes.len()).sum();
        assert_eq!(edges_after, edges_before);
        assert_eq!(network.super_node().unwrap().bandwidth(), 1_000_000);
    }

    #[test]
    fn test_probability_out_of_range() {
        let mut network = network(10);
        let config = RelayHubConfig {
            adoption_probability: 1.2,
            ..Default::default()
        };
        assert_eq!(
            wire_relay_hub(&mut network, &config, &mut StdRng::seed_from_u64(1)),
            Err(ConfigError::ProbabilityOutOfRange(1.2))
        );
        assert!(!network.has_super_node());
    }
}
