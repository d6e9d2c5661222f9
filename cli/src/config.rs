//! TOML Scenario Configuration
//!
//! These structures match the scenario file consumed by the bench binary.

use anyhow::{Context, Result};
use phy::prach::PreambleFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main scenario structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScenarioConfig {
    /// Carrier configuration
    pub carrier: CarrierSection,
    /// PRACH configuration
    pub prach: PrachSection,
    /// Occasion under test
    pub occasion: OccasionSection,
}

/// Carrier configuration section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CarrierSection {
    /// Carrier subcarrier spacing in kHz
    #[serde(default = "default_scs_khz")]
    pub scs_khz: u32,
}

fn default_scs_khz() -> u32 {
    15
}

/// PRACH configuration section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PrachSection {
    /// Preamble format ("0"-"3", "A1"-"C2")
    pub format: PreambleFormat,
    /// Zero correlation zone configuration index (0-15)
    pub zero_correlation_zone: u8,
    /// Logical root sequence index
    #[serde(default)]
    pub sequence_index: u16,
}

/// Occasion synthesis section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OccasionSection {
    /// Preamble index to embed (0-63)
    pub preamble_index: u8,
    /// Timing offset in delay-domain bins
    #[serde(default)]
    pub offset_bins: f64,
    /// SNR in dB; omit for a noiseless occasion
    #[serde(default)]
    pub snr_db: Option<f32>,
    /// Number of preamble replicas
    #[serde(default = "default_one")]
    pub replicas: usize,
    /// Number of receive antennas
    #[serde(default = "default_one")]
    pub antennas: usize,
    /// Average replicas before correlation (assumes no residual CFO)
    #[serde(default)]
    pub ignore_cfo: bool,
    /// Seed for the noise generator
    #[serde(default)]
    pub seed: u64,
}

fn default_one() -> usize {
    1
}

impl ScenarioConfig {
    /// Load a scenario from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("reading scenario {}", path.as_ref().display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("parsing scenario {}", path.as_ref().display()))
    }
}
