//! # Propagation Simulator
//!
//! Scenario configuration, result statistics and event sinks around the
//! `bp_rust` engine. Used by the `scenario_runner` binary and the examples
//! in this directory.

mod config;
mod event_sinks;
mod runner;
mod stats;

#[allow(unused_imports)]
pub use config::{OutputConfig, PropagationSimConfig, SimMode};
#[allow(unused_imports)]
pub use event_sinks::{node_label, ConsoleEventSink, CsvEventSink, MultiEventSink};
#[allow(unused_imports)]
pub use runner::{collect_network_stats, PropagationRunner};
#[allow(unused_imports)]
pub use stats::{CoverageMilestone, NetworkStats, ObserverReport, Outcome, SimulationResult};
