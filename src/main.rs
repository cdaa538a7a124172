use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use simple_logger::SimpleLogger;

use bp_rust::{Block, EngineConfig, NodeIndex, PropagationEngine, TopologyBuilder, TopologyConfig};

const OBSERVER: NodeIndex = 5000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    SimpleLogger::new().init()?;

    info!("starting");

    let mut seed = [0u8; 32];
    rand::thread_rng().fill(&mut seed);
    let mut rng = StdRng::from_seed(seed);

    // A network of 10000 nodes
    let network = TopologyBuilder::new(TopologyConfig::default())?.build(&mut rng)?;

    let mut engine = PropagationEngine::new(network, EngineConfig::default())?;
    engine.observe(OBSERVER, |node: NodeIndex, block: &Block| {
        info!(
            "Node {} receive block after {} propagation ({} units)",
            node, block.hop_count, block.size
        );
    })?;

    let result = engine.run(&mut rng)?;

    info!(
        "origin {}: {}ms elapsed, {} hops, {} nodes reached, {} unreached",
        result.origin, result.elapsed, result.hop_count, result.reached, result.unreached
    );
    info!("let seed = {:?};", seed);

    Ok(())
}
