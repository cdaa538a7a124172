// Propagation Simulator Configuration

use bp_rust::{EngineConfig, NodeIndex, RelayHubConfig, TopologyConfig};

// ============================================================================
// Main Configuration
// ============================================================================

/// Main configuration for a propagation simulation
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct PropagationSimConfig {
    /// Timed (bandwidth-limited) or flood (instant hop) propagation
    pub mode: SimMode,

    /// Random seed for reproducibility (set from the command line, not YAML)
    #[serde(skip)]
    pub seed: Option<[u8; 32]>,

    /// Random graph shape
    pub topology: TopologyConfig,

    /// Block and tick parameters
    pub engine: EngineConfig,

    /// Relay hub variant, off when absent
    pub relay_hub: Option<RelayHubConfig>,

    /// Origin node; drawn at random when absent
    pub origin: Option<NodeIndex>,

    /// Nodes whose completion gets reported
    pub observers: Vec<NodeIndex>,

    /// Report when the super-node receives the block
    pub observe_super_node: bool,

    /// Output configuration
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimMode {
    #[default]
    Timed,
    Flood,
}

// ============================================================================
// Output Configuration
// ============================================================================

/// Configuration for output and logging
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Enable console event logging
    pub enable_console: bool,

    /// CSV event output file path
    pub csv_path: Option<String>,
}

// ============================================================================
// Default Implementations
// ============================================================================

impl Default for PropagationSimConfig {
    fn default() -> Self {
        Self {
            mode: SimMode::Timed,
            seed: None,
            topology: TopologyConfig::default(),
            engine: EngineConfig::default(),
            relay_hub: None,
            origin: None,
            observers: Vec::new(),
            observe_super_node: true,
            output: OutputConfig::default(),
        }
    }
}
