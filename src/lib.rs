//! # bpRust - Bandwidth-Limited Block Propagation
//!
//! Simulates how a freshly produced block spreads through a peer-to-peer
//! network whose links have bounded bandwidth, to estimate how long and how
//! many hops it takes to reach the whole network.
//!
//! ## Core Components
//!
//! - **TopologyBuilder**: random directed peer graph with bounded degrees and no self-loops
//! - **wire_relay_hub**: optional high-bandwidth super-node shortcut for a subset of nodes
//! - **Node**: per-node receive state machine with fractional transfer progress
//! - **PropagationEngine**: discrete-time, bandwidth-negotiating simulation loop
//! - **FloodSimulator**: unbounded-bandwidth baseline counting hops only
//!
//! ```no_run
//! use bp_rust::{EngineConfig, PropagationEngine, TopologyBuilder, TopologyConfig};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let network = TopologyBuilder::new(TopologyConfig::default())?.build(&mut rng)?;
//!
//! let mut engine = PropagationEngine::new(network, EngineConfig::default())?;
//! engine.observe(5000, |node: bp_rust::NodeIndex, block: &bp_rust::Block| {
//!     println!("Node {} received block after {} propagation", node, block.hop_count);
//! })?;
//!
//! let result = engine.run(&mut rng)?;
//! println!("{}ms, {} nodes reached", result.elapsed, result.reached);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Simulation Drivers
//!
//! Scenario configuration, statistics and event sinks live in `simulator/`,
//! which builds on this library.

pub mod bp_engine;
pub mod bp_flood;
pub mod bp_interface;
pub mod bp_node;
pub mod bp_relay_hub;
pub mod bp_topology;

// Re-export commonly used types
pub use bp_engine::{EngineConfig, PropagationEngine, RunResult, TickSample};
pub use bp_flood::{FloodResult, FloodSimulator};
pub use bp_interface::{
    Bandwidth, Block, BlockHeight, BlockObserver, ConfigError, Event, EventSink, NoOpSink,
    NodeIndex, SimTime, SUPER_NODE_INDEX,
};
pub use bp_node::{Node, NodeState, ReceiveOutcome};
pub use bp_relay_hub::{wire_relay_hub, RelayHubConfig};
pub use bp_topology::{Network, TopologyBuilder, TopologyConfig};
