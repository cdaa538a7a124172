//! Bandwidth-Aware Propagation Engine
//!
//! Discrete-time simulation of one block spreading from a single origin.
//! Every tick:
//! 1. nodes in the active set that hold the block act as sources
//! 2. their idle outbound peers become candidates, offered the block at the
//!    rate of the slower end of the link
//! 3. candidates join the active set (deduplicated), settled sources leave it
//! 4. every remaining node downloads one tick's worth of the block
//!
//! Sources and candidates are computed from the state at the start of the tick,
//! before any node is driven. The run ends when the active set is empty.

use std::collections::BTreeMap;

use hashbrown::HashMap;
use indexmap::IndexSet;
use log::{debug, info};
use rand::Rng;

use crate::bp_interface::{
    Bandwidth, Block, BlockHeight, BlockObserver, ConfigError, Event, EventSink, NodeIndex,
    NoOpSink, SimTime,
};
use crate::bp_node::ReceiveOutcome;
use crate::bp_topology::Network;

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Block payload size in bandwidth units (default: 32,000)
    pub block_size: u64,

    /// Simulated duration of one tick (default: 100ms)
    pub tick_duration_ms: SimTime,

    /// Height of the propagated block (default: 1)
    pub block_height: BlockHeight,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            block_size: 32_000,
            tick_duration_ms: 100,
            block_height: 1,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        if self.tick_duration_ms == 0 {
            return Err(ConfigError::ZeroTickDuration);
        }
        if self.block_height == 0 {
            return Err(ConfigError::ZeroBlockHeight);
        }
        Ok(())
    }
}

// ============================================================================
// Results
// ============================================================================

/// Network state sampled at the end of a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSample {
    pub tick: u64,
    pub elapsed: SimTime,

    /// Ordinary nodes holding the full block
    pub reached: usize,

    /// Nodes mid-transfer during this tick
    pub active: usize,
}

#[derive(Debug, Clone)]
pub struct RunResult {
    pub origin: NodeIndex,

    /// Simulated time until the active set emptied
    pub elapsed: SimTime,

    /// Final hop count of the block (one per tick)
    pub hop_count: u64,

    /// Ordinary nodes holding the block, origin included
    pub reached: usize,

    /// Ordinary nodes never reached (partitioned from the origin)
    pub unreached: usize,

    pub total_nodes: usize,

    pub super_node_reached: bool,

    pub timeline: Vec<TickSample>,

    /// Hop count at which each observed node completed
    pub completion_ticks: BTreeMap<NodeIndex, u64>,
}

impl RunResult {
    pub fn coverage(&self) -> f64 {
        if self.total_nodes == 0 {
            0.0
        } else {
            self.reached as f64 / self.total_nodes as f64
        }
    }

    /// First tick at which at least `fraction` of the ordinary nodes held the block
    pub fn time_to_coverage(&self, fraction: f64) -> Option<SimTime> {
        let target = (self.total_nodes as f64 * fraction).ceil() as usize;
        if target <= 1 {
            return Some(0);
        }
        self.timeline
            .iter()
            .find(|sample| sample.reached >= target)
            .map(|sample| sample.elapsed)
    }
}

// ============================================================================
// Engine
// ============================================================================

pub struct PropagationEngine {
    network: Network,
    config: EngineConfig,
    observers: HashMap<usize, Box<dyn BlockObserver>>,
    event_sink: Box<dyn EventSink>,
}

impl PropagationEngine {
    pub fn new(network: Network, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if network.node_count() == 0 {
            return Err(ConfigError::EmptyNetwork);
        }

        Ok(Self {
            network,
            config,
            observers: HashMap::new(),
            event_sink: Box::new(NoOpSink),
        })
    }

    pub fn with_event_sink(mut self, sink: Box<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    /// Register a completion hook for `index` (may be the super-node sentinel).
    /// A later registration for the same node replaces the earlier one.
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

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run from an origin drawn uniformly among the ordinary nodes
    pub fn run<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<RunResult, ConfigError> {
        let origin = rng.gen_range(0..self.network.node_count());
        self.run_from(origin)
    }

    /// Run with `origin` holding the block at time zero.
    ///
    /// The network is reset first, so the same topology can host several runs.
    pub fn run_from(&mut self, origin: NodeIndex) -> Result<RunResult, ConfigError> {
        let origin_slot = self
            .network
            .slot_of(origin)
            .filter(|slot| Some(*slot) != self.network.super_slot())
            .ok_or(ConfigError::UnknownNode(origin))?;

        self.network.reset();

        let height = self.config.block_height;
        let tick_duration_ms = self.config.tick_duration_ms;
        let super_slot = self.network.super_slot();

        let mut block = Block::new(height, self.config.block_size);
        self.network.slot_mut(origin_slot).seed(&block);

        let mut elapsed: SimTime = 0;
        let mut reached = 1;
        let mut super_node_reached = false;
        let mut timeline = Vec::new();
        let mut completion_ticks = BTreeMap::new();

        let mut active: IndexSet<usize> = IndexSet::new();
        active.insert(origin_slot);

        // Negotiated rate per candidate; the last source to offer this tick sets it
        let mut offers: HashMap<usize, Bandwidth> = HashMap::new();

        loop {
            let mut candidates = Vec::new();

            for &slot in &active {
                let source = self.network.slot(slot);
                if !source.is_done(height) {
                    continue;
                }

                for &peer_slot in source.outbound_slots() {
                    let candidate = self.network.slot(peer_slot);
                    if !candidate.is_idle(height) {
                        continue;
                    }

                    let rate = candidate.negotiate(source.bandwidth());
                    offers.insert(peer_slot, rate);

                    self.event_sink.log(
                        block.hop_count,
                        candidate.index,
                        Event::Offered {
                            source: source.index,
                            negotiated_bandwidth: rate,
                        },
                    );

                    candidates.push(peer_slot);
                }
            }

            active.extend(candidates);

            let network = &self.network;
            active.retain(|slot| !network.slot(*slot).is_done(height));

            if active.is_empty() {
                break;
            }

            block.hop_count += 1;
            elapsed += self.config.tick_duration_ms;

            for &slot in &active {
                let offer = offers.remove(&slot);
                let node = self.network.slot_mut(slot);
                let index = node.index;
                let starting = !node.in_progress();

                let outcome = node.receive(&block, offer, tick_duration_ms);

                if starting && outcome != ReceiveOutcome::Rejected {
                    self.event_sink.log(
                        block.hop_count,
                        index,
                        Event::TransferStarted {
                            height,
                            active_bandwidth: offer.map_or(node.bandwidth(), |o| node.negotiate(o)),
                        },
                    );
                }

                match outcome {
                    ReceiveOutcome::Completed => {
                        if Some(slot) == super_slot {
                            super_node_reached = true;
                        } else {
                            reached += 1;
                        }

                        self.event_sink.log(
                            block.hop_count,
                            index,
                            Event::TransferCompleted {
                                height,
                                hop_count: block.hop_count,
                                elapsed,
                            },
                        );

                        if let Some(observer) = self.observers.get_mut(&slot) {
                            observer.block_completed(index, &block);
                            completion_ticks.insert(index, block.hop_count);
                        }
                    }
                    ReceiveOutcome::Rejected => {
                        let height_reached = self.network.slot(slot).height_reached();
                        self.event_sink.log(
                            block.hop_count,
                            index,
                            Event::DuplicateRejected {
                                height,
                                height_reached,
                            },
                        );
                    }
                    ReceiveOutcome::InProgress => {}
                }
            }

            timeline.push(TickSample {
                tick: block.hop_count,
                elapsed,
                reached,
                active: active.len(),
            });

            debug!(
                "Simulation time elapsed: {}ms, {} nodes reached, {} active",
                elapsed,
                reached,
                active.len()
            );
        }

        let total_nodes = self.network.node_count();
        let result = RunResult {
            origin,
            elapsed,
            hop_count: block.hop_count,
            reached,
            unreached: total_nodes - reached,
            total_nodes,
            super_node_reached,
            timeline,
            completion_ticks,
        };

        info!(
            "Propagation finished after {}ms ({} ticks): {}/{} nodes reached",
            result.elapsed, result.hop_count, result.reached, result.total_nodes
        );

        Ok(result)
    }
}
