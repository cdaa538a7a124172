// Propagation Simulator Runner

use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;

use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use bp_rust::{
    wire_relay_hub, Block, ConfigError, EventSink, FloodSimulator, Network, NodeIndex,
    PropagationEngine, TopologyBuilder, SUPER_NODE_INDEX,
};

use super::config::{PropagationSimConfig, SimMode};
use super::event_sinks::{node_label, ConsoleEventSink, CsvEventSink, MultiEventSink};
use super::stats::{NetworkStats, ObserverReport, Outcome, SimulationResult};

/// Builds a network from configuration and runs one block through it
pub struct PropagationRunner {
    config: PropagationSimConfig,
    rng: StdRng,
    seed_used: [u8; 32],
}

impl PropagationRunner {
    /// Create new simulator
    pub fn new(config: PropagationSimConfig) -> Self {
        let seed = config.seed.unwrap_or_else(|| {
            let mut seed = [0u8; 32];
            rand::thread_rng().fill(&mut seed);
            seed
        });

        Self {
            config,
            rng: StdRng::from_seed(seed),
            seed_used: seed,
        }
    }

    pub fn seed_used(&self) -> [u8; 32] {
        self.seed_used
    }

    /// Run the simulation
    pub fn run(mut self) -> Result<SimulationResult, Box<dyn Error>> {
        // 1. Build topology, optionally with the relay hub
        let mut network = TopologyBuilder::new(self.config.topology.clone())?.build(&mut self.rng)?;

        let hub_adapted = match &self.config.relay_hub {
            Some(hub) => wire_relay_hub(&mut network, hub, &mut self.rng)?,
            None => 0,
        };

        let network_stats = collect_network_stats(&network, hub_adapted);

        // 2. Pick origin and observers
        let origin = match self.config.origin {
            Some(origin) => origin,
            None => self.rng.gen_range(0..network.node_count()),
        };

        let watched = self.watched_nodes(&network)?;
        let reports = Rc::new(RefCell::new(Vec::new()));

        info!(
            "Running {:?} propagation from node {} ({} observers)",
            self.config.mode,
            origin,
            watched.len()
        );

        // 3. Run
        let outcome = match self.config.mode {
            SimMode::Timed => {
                let mut engine = PropagationEngine::new(network, self.config.engine.clone())?
                    .with_event_sink(self.event_sink()?);
                for node in &watched {
                    engine.observe(*node, report_completion(reports.clone()))?;
                }
                Outcome::Timed(engine.run_from(origin)?)
            }
            SimMode::Flood => {
                let mut flood = FloodSimulator::new(network, self.config.engine.block_height)?;
                for node in &watched {
                    flood.observe(*node, report_completion(reports.clone()))?;
                }
                Outcome::Flood(flood.run_from(origin)?)
            }
        };

        if outcome.unreached() > 0 {
            warn!(
                "{} nodes were never reached from origin {}",
                outcome.unreached(),
                origin
            );
        }

        let observer_reports = reports.borrow().clone();
        Ok(SimulationResult {
            seed_used: self.seed_used,
            network: network_stats,
            outcome,
            observer_reports,
        })
    }

    /// Observed nodes, validated against the built network
    fn watched_nodes(&self, network: &Network) -> Result<Vec<NodeIndex>, ConfigError> {
        let mut watched = Vec::new();
        for &node in &self.config.observers {
            if node >= network.node_count() {
                return Err(ConfigError::UnknownNode(node));
            }
            watched.push(node);
        }

        if self.config.observe_super_node && network.has_super_node() {
            watched.push(SUPER_NODE_INDEX);
        }

        Ok(watched)
    }

    fn event_sink(&self) -> std::io::Result<Box<dyn EventSink>> {
        let mut sinks = MultiEventSink::new();

        if self.config.output.enable_console {
            sinks.add_sink(Box::new(ConsoleEventSink::new(true)));
        }
        if let Some(path) = &self.config.output.csv_path {
            sinks.add_sink(Box::new(CsvEventSink::new(path)?));
        }

        if sinks.is_empty() {
            Ok(Box::new(bp_rust::NoOpSink))
        } else {
            Ok(Box::new(sinks))
        }
    }
}

/// Observer that logs the completion and keeps a report of it
fn report_completion(
    reports: Rc<RefCell<Vec<ObserverReport>>>,
) -> impl FnMut(NodeIndex, &Block) + 'static {
    move |node: NodeIndex, block: &Block| {
        info!(
            "Node {} receive block after {} propagation",
            node_label(node),
            block.hop_count
        );
        reports.borrow_mut().push(ObserverReport {
            node,
            hop_count: block.hop_count,
            block_size: block.size,
        });
    }
}

pub fn collect_network_stats(network: &Network, hub_adapted: usize) -> NetworkStats {
    let nodes = network.ordinary_nodes();
    if nodes.is_empty() {
        return NetworkStats::default();
    }

    let degrees: Vec<usize> = nodes.iter().map(|n| n.outbound_peer_indexes.len()).collect();
    let outbound_edges: usize = degrees.iter().sum();

    NetworkStats {
        node_count: nodes.len(),
        outbound_edges,
        min_outbound: degrees.iter().copied().min().unwrap_or(0),
        max_outbound: degrees.iter().copied().max().unwrap_or(0),
        avg_outbound: outbound_edges as f64 / nodes.len() as f64,
        min_bandwidth: nodes.iter().map(|n| n.bandwidth()).min().unwrap_or(0),
        max_bandwidth: nodes.iter().map(|n| n.bandwidth()).max().unwrap_or(0),
        hub_adapted,
    }
}
