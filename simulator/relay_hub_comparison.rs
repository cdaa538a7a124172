// Relay Hub Adoption Comparison
//
// Runs the same network (same seed, same origin) with increasing relay hub
// adoption and compares time to coverage. p = 0 wires no node to the hub,
// so it doubles as the plain-network baseline.

mod propagation;

use propagation::{Outcome, PropagationRunner, PropagationSimConfig};
use rand::Rng;
use simple_logger::SimpleLogger;

use bp_rust::{RelayHubConfig, TopologyConfig};

const ADOPTION: [f64; 5] = [0.0, 0.05, 0.2, 0.5, 1.0];

struct Row {
    probability: f64,
    hub_adapted: usize,
    hops: u64,
    elapsed: u64,
    half: Option<u64>,
    ninety: Option<u64>,
    reached: usize,
}

fn run_with_adoption(seed: [u8; 32], probability: f64) -> Row {
    let mut config = PropagationSimConfig::default();
    config.seed = Some(seed);
    config.topology = TopologyConfig {
        node_count: 2000,
        ..Default::default()
    };
    config.origin = Some(0);
    config.relay_hub = Some(RelayHubConfig {
        adoption_probability: probability,
        ..Default::default()
    });

    let result = match PropagationRunner::new(config).run() {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Run with p={} failed: {}", probability, e);
            std::process::exit(1);
        }
    };

    let Outcome::Timed(run) = &result.outcome else {
        unreachable!("comparison runs in timed mode");
    };

    Row {
        probability,
        hub_adapted: result.network.hub_adapted,
        hops: run.hop_count,
        elapsed: run.elapsed,
        half: run.time_to_coverage(0.5),
        ninety: run.time_to_coverage(0.9),
        reached: run.reached,
    }
}

fn ms(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{}ms", v))
}

fn main() {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Warn)
        .init()
        .unwrap();

    println!("╔════════════════════════════════════════════════════════╗");
    println!("║    Relay Hub Adoption Comparison                       ║");
    println!("╚════════════════════════════════════════════════════════╝\n");

    let mut seed = [0u8; 32];
    rand::thread_rng().fill(&mut seed);

    // The topology draws come before the hub draws, so every run sees the
    // same peer graph and only the hub wiring differs
    let rows: Vec<Row> = ADOPTION
        .iter()
        .map(|p| run_with_adoption(seed, *p))
        .collect();

    println!(
        "{:>6} {:>8} {:>6} {:>10} {:>10} {:>10} {:>8}",
        "p", "adapted", "hops", "elapsed", "50%", "90%", "reached"
    );
    println!("{}", "─".repeat(64));
    for row in &rows {
        println!(
            "{:>6.2} {:>8} {:>6} {:>10} {:>10} {:>10} {:>8}",
            row.probability,
            row.hub_adapted,
            row.hops,
            format!("{}ms", row.elapsed),
            ms(row.half),
            ms(row.ninety),
            row.reached
        );
    }

    println!("\nSeed: {:?}", seed);
}
