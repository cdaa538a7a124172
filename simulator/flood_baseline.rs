// Flood Baseline vs Timed Propagation
//
// Builds one network, runs the unlimited-bandwidth flood over it, then the
// timed engine from the same origin. The flood hop count is the floor the
// timed run can never beat.

mod propagation;

use propagation::{collect_network_stats, node_label};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use simple_logger::SimpleLogger;

use bp_rust::{
    Block, EngineConfig, FloodSimulator, NodeIndex, PropagationEngine, TopologyBuilder,
    TopologyConfig,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()?;

    println!("╔════════════════════════════════════════════════════════╗");
    println!("║    Flood Baseline vs Timed Propagation                 ║");
    println!("╚════════════════════════════════════════════════════════╝\n");

    let mut seed = [0u8; 32];
    rand::thread_rng().fill(&mut seed);
    let mut rng = StdRng::from_seed(seed);

    let network = TopologyBuilder::new(TopologyConfig::default())?.build(&mut rng)?;
    let stats = collect_network_stats(&network, 0);
    println!(
        "Network: {} nodes, avg outbound {:.2}, bandwidth {}..={}\n",
        stats.node_count, stats.avg_outbound, stats.min_bandwidth, stats.max_bandwidth
    );

    let origin = rng.gen_range(0..network.node_count());

    // Flood first; the network is reset at the start of every run
    let mut flood = FloodSimulator::new(network, 1)?;
    let flood_result = flood.run_from(origin)?;

    let mut engine = PropagationEngine::new(flood.into_network(), EngineConfig::default())?;
    engine.observe(5000, |node: NodeIndex, block: &Block| {
        log::info!(
            "Node {} receive block after {} propagation",
            node_label(node),
            block.hop_count
        );
    })?;
    let timed = engine.run_from(origin)?;

    println!("\nOrigin: {}", origin);
    println!("  Flood: {} hops, {} reached", flood_result.hops, flood_result.reached);
    println!("         new per hop {:?}", flood_result.per_round);
    println!(
        "  Timed: {} ticks ({}ms), {} reached",
        timed.hop_count, timed.elapsed, timed.reached
    );
    if flood_result.hops > 0 {
        println!(
            "  Bandwidth slowdown: {:.1}x ticks per flood hop",
            timed.hop_count as f64 / flood_result.hops as f64
        );
    }
    println!("\nSeed: {:?}", seed);

    Ok(())
}
