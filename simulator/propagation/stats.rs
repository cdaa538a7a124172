// Propagation Simulator Statistics

use bp_rust::{FloodResult, NodeIndex, RunResult, SimTime};

use super::event_sinks::node_label;

// ============================================================================
// Simulation Result
// ============================================================================

/// Complete simulation result
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Random seed used
    pub seed_used: [u8; 32],

    /// Shape of the generated network
    pub network: NetworkStats,

    /// Engine output
    pub outcome: Outcome,

    /// Completion reports from observed nodes, in completion order
    pub observer_reports: Vec<ObserverReport>,
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Timed(RunResult),
    Flood(FloodResult),
}

/// Graph statistics gathered before the run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkStats {
    pub node_count: usize,
    pub outbound_edges: usize,
    pub min_outbound: usize,
    pub max_outbound: usize,
    pub avg_outbound: f64,
    pub min_bandwidth: u64,
    pub max_bandwidth: u64,

    /// Nodes wired to the relay hub (0 without a hub)
    pub hub_adapted: usize,
}

/// What an observer saw when its node completed
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverReport {
    pub node: NodeIndex,
    pub hop_count: u64,
    pub block_size: u64,
}

/// Time to reach a share of the network
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageMilestone {
    pub fraction: f64,
    pub elapsed: Option<SimTime>,
}

pub const MILESTONES: [f64; 4] = [0.5, 0.9, 0.99, 1.0];

impl Outcome {
    pub fn reached(&self) -> usize {
        match self {
            Outcome::Timed(r) => r.reached,
            Outcome::Flood(r) => r.reached,
        }
    }

    pub fn unreached(&self) -> usize {
        match self {
            Outcome::Timed(r) => r.unreached,
            Outcome::Flood(r) => r.unreached,
        }
    }

    pub fn hops(&self) -> u64 {
        match self {
            Outcome::Timed(r) => r.hop_count,
            Outcome::Flood(r) => r.hops,
        }
    }

    pub fn milestones(&self) -> Vec<CoverageMilestone> {
        match self {
            Outcome::Timed(r) => MILESTONES
                .iter()
                .map(|&fraction| CoverageMilestone {
                    fraction,
                    elapsed: r.time_to_coverage(fraction),
                })
                .collect(),
            Outcome::Flood(_) => Vec::new(),
        }
    }
}

impl SimulationResult {
    pub fn print_summary(&self) {
        println!("\n╔════════════════════════════════════════════════════════╗");
        println!("║        Block Propagation Results                       ║");
        println!("╚════════════════════════════════════════════════════════╝\n");

        println!("Configuration:");
        println!("  Seed: {:?}\n", self.seed_used);

        println!("Network:");
        println!("  Nodes: {}", self.network.node_count);
        println!(
            "  Outbound peers: min={}, max={}, avg={:.2} ({} edges)",
            self.network.min_outbound,
            self.network.max_outbound,
            self.network.avg_outbound,
            self.network.outbound_edges
        );
        println!(
            "  Bandwidth: {}..={}",
            self.network.min_bandwidth, self.network.max_bandwidth
        );
        if self.network.hub_adapted > 0 {
            println!("  Hub-adapted nodes: {}", self.network.hub_adapted);
        }
        println!();

        match &self.outcome {
            Outcome::Timed(result) => {
                println!("Timed Propagation (origin {}):", result.origin);
                println!("  Elapsed: {}ms", result.elapsed);
                println!("  Hops (ticks): {}", result.hop_count);
                println!(
                    "  Reached: {} / {} ({:.1}%)",
                    result.reached,
                    result.total_nodes,
                    result.coverage() * 100.0
                );
                if result.unreached > 0 {
                    println!("  Not reached: {}", result.unreached);
                }
                if result.super_node_reached {
                    println!("  Super-node reached: yes");
                }
                for milestone in self.outcome.milestones() {
                    match milestone.elapsed {
                        Some(t) => println!("  {:>5.1}% coverage at {}ms", milestone.fraction * 100.0, t),
                        None => println!("  {:>5.1}% coverage never reached", milestone.fraction * 100.0),
                    }
                }
            }
            Outcome::Flood(result) => {
                println!("Flood Propagation (origin {}):", result.origin);
                println!("  Hops: {}", result.hops);
                println!("  Reached: {}", result.reached);
                if result.unreached > 0 {
                    println!("  Not reached: {}", result.unreached);
                }
                println!("  New nodes per hop: {:?}", result.per_round);
            }
        }
        println!();

        if !self.observer_reports.is_empty() {
            println!("Observers:");
            for report in &self.observer_reports {
                println!(
                    "  Node {} received block after {} propagation ({} units)",
                    node_label(report.node),
                    report.hop_count,
                    report.block_size
                );
            }
            println!();
        }
    }
}
