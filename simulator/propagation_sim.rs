// Block Propagation Simulator Example
//
// One bandwidth-limited run over the default 10,000 node network, watching
// node 5000 and the relay hub.

mod propagation;

use propagation::{PropagationRunner, PropagationSimConfig};
use simple_logger::SimpleLogger;

use bp_rust::RelayHubConfig;

fn main() {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .unwrap();

    println!("╔════════════════════════════════════════════════════════╗");
    println!("║    Block Propagation Simulator                         ║");
    println!("╚════════════════════════════════════════════════════════╝\n");

    let mut config = PropagationSimConfig::default();

    // Watch one node in the middle of the index range
    config.observers = vec![5000];

    // A fifth of the nodes connect to a 1,000,000/s relay hub
    config.relay_hub = Some(RelayHubConfig::default());

    // Flip on for a per-event trace (very noisy at this size)
    config.output.enable_console = false;

    let runner = PropagationRunner::new(config);
    match runner.run() {
        Ok(result) => result.print_summary(),
        Err(e) => {
            eprintln!("Simulation failed: {}", e);
            std::process::exit(1);
        }
    }
}
