// Scenario Runner - Load and execute propagation scenario YAML files
//
// Usage:
//   cargo run --bin scenario_runner scenarios/baseline.yaml
//   cargo run --bin scenario_runner scenarios/  (runs all .yaml files in directory)
//   cargo run --bin scenario_runner scenarios/baseline.yaml --seed 0x1234...

mod propagation;

use std::env;
use std::fs;
use std::path::Path;

use log::error;
use simple_logger::SimpleLogger;

use propagation::{PropagationRunner, PropagationSimConfig, SimMode};

/// Scenario file format
#[derive(Debug, serde::Deserialize)]
struct ScenarioFile {
    /// Scenario metadata
    #[serde(default)]
    meta: ScenarioMeta,

    /// Simulation configuration; omitted keys keep their defaults
    #[serde(default)]
    config: PropagationSimConfig,
}

#[derive(Debug, Default, serde::Deserialize)]
struct ScenarioMeta {
    name: Option<String>,
    description: Option<String>,
    hypothesis: Option<String>,
}

fn main() {
    SimpleLogger::new().init().unwrap();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <scenario.yaml | directory/> [--seed SEED_HEX]", args[0]);
        eprintln!("\nExamples:");
        eprintln!("  {} scenarios/baseline.yaml", args[0]);
        eprintln!("  {} scenarios/", args[0]);
        eprintln!("  {} scenarios/relay_hub.yaml --seed 0x123456...", args[0]);
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);

    // Parse optional seed
    let seed: Option<[u8; 32]> = if args.len() >= 4 && args[2] == "--seed" {
        match parse_seed_hex(&args[3]) {
            Ok(seed) => Some(seed),
            Err(e) => {
                eprintln!("Invalid hex seed: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        None
    };

    if path.is_file() {
        run_scenario_file(path, seed);
    } else if path.is_dir() {
        run_scenario_directory(path, seed);
    } else {
        eprintln!("Error: Path does not exist: {}", path.display());
        std::process::exit(1);
    }
}

fn run_scenario_directory(dir: &Path, seed: Option<[u8; 32]>) {
    let mut scenarios = Vec::new();

    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            let ext = path.extension().and_then(|s| s.to_str());
            if ext == Some("yaml") || ext == Some("yml") {
                scenarios.push(path);
            }
        }
    }

    scenarios.sort();

    if scenarios.is_empty() {
        eprintln!("No .yaml files found in {}", dir.display());
        std::process::exit(1);
    }

    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  SCENARIO RUNNER - Multiple Scenarios                  ║");
    println!("╚════════════════════════════════════════════════════════╝\n");
    println!("Found {} scenario(s) to run\n", scenarios.len());

    for (i, scenario_path) in scenarios.iter().enumerate() {
        println!("\n{}/{} Running: {}\n", i + 1, scenarios.len(), scenario_path.display());
        run_scenario_file(scenario_path, seed);
    }

    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  All scenarios complete!                               ║");
    println!("╚════════════════════════════════════════════════════════╝\n");
}

fn run_scenario_file(path: &Path, seed: Option<[u8; 32]>) {
    println!("Loading scenario from: {}", path.display());

    let yaml_content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {}", path.display(), e);
        std::process::exit(1);
    });

    let scenario: ScenarioFile = serde_yaml::from_str(&yaml_content).unwrap_or_else(|e| {
        eprintln!("Failed to parse {}: {}", path.display(), e);
        std::process::exit(1);
    });

    println!("\n╔════════════════════════════════════════════════════════╗");
    match scenario.meta.name {
        Some(ref name) => println!("║  {}", name),
        None => println!(
            "║  Scenario: {}",
            path.file_stem().and_then(|s| s.to_str()).unwrap_or("unnamed")
        ),
    }
    println!("╚════════════════════════════════════════════════════════╝\n");

    if let Some(ref desc) = scenario.meta.description {
        println!("{}\n", desc);
    }

    if let Some(ref hypothesis) = scenario.meta.hypothesis {
        println!("Hypothesis:");
        println!("  {}\n", hypothesis);
    }

    let mut config = scenario.config;
    config.seed = seed;

    println!("Configuration:");
    println!("  Mode: {:?}", config.mode);
    println!("  Nodes: {}", config.topology.node_count);
    println!(
        "  Inbound: {:?}  Outbound: {:?}  Bandwidth: {:?}",
        config.topology.inbound, config.topology.outbound, config.topology.bandwidth
    );
    if config.mode == SimMode::Timed {
        println!(
            "  Block size: {}  Tick: {}ms",
            config.engine.block_size, config.engine.tick_duration_ms
        );
    }
    match &config.relay_hub {
        Some(hub) => println!(
            "  Relay hub: p={} bandwidth={}",
            hub.adoption_probability, hub.bandwidth
        ),
        None => println!("  Relay hub: off"),
    }
    println!("\nStarting simulation...\n");

    match PropagationRunner::new(config).run() {
        Ok(result) => {
            result.print_summary();
            println!("Seed (hex): 0x{}", seed_hex(&result.seed_used));
            println!("\n✓ Scenario complete!\n");
        }
        Err(e) => {
            error!("Scenario {} failed: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

/// Parse a full 32-byte seed written as 64 hex digits, with optional `0x`
fn parse_seed_hex(hex: &str) -> Result<[u8; 32], String> {
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    if hex.len() != 64 {
        return Err(format!("expected 64 hex digits, got {}", hex.len()));
    }

    let mut seed = [0u8; 32];
    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        let byte_str = std::str::from_utf8(chunk).map_err(|e| e.to_string())?;
        seed[i] = u8::from_str_radix(byte_str, 16).map_err(|e| e.to_string())?;
    }

    Ok(seed)
}

fn seed_hex(seed: &[u8; 32]) -> String {
    seed.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed_hex_round_trip() {
        let mut expected = [0u8; 32];
        expected[0] = 0x12;
        expected[1] = 0xab;
        expected[31] = 0xff;

        let hex = seed_hex(&expected);
        assert_eq!(hex.len(), 64);
        assert_eq!(parse_seed_hex(&format!("0x{}", hex)).unwrap(), expected);
        assert_eq!(parse_seed_hex(&hex).unwrap(), expected);
    }

    #[test]
    fn test_parse_seed_hex_requires_full_length() {
        assert!(parse_seed_hex("12ab").is_err());
        assert!(parse_seed_hex("0x12ab").is_err());
        assert!(parse_seed_hex(&"a".repeat(63)).is_err());
        assert!(parse_seed_hex(&"a".repeat(66)).is_err());
        assert_eq!(parse_seed_hex(&"a".repeat(64)).unwrap(), [0xaa; 32]);
    }

    #[test]
    fn test_parse_seed_hex_rejects_garbage() {
        assert!(parse_seed_hex(&"z".repeat(64)).is_err());
        // Right byte length, but not hex
        assert!(parse_seed_hex(&"é".repeat(32)).is_err());
    }

    #[test]
    fn test_scenario_file_without_config() {
        let yaml = r#"
meta:
  name: Defaults
"#;
        let scenario: ScenarioFile = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(scenario.meta.name.as_deref(), Some("Defaults"));
        assert_eq!(scenario.config.topology.node_count, 10_000);
        assert!(scenario.config.relay_hub.is_none());
    }
}
