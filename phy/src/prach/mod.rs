//! PRACH (Physical Random Access Channel) Preamble Detection
//!
//! Implements PRACH preamble detection according to 3GPP TS 38.211.
//! Given the samples captured during one PRACH occasion, the detector decides
//! which of the 64 candidate preambles were transmitted and estimates their
//! timing offset, a detection metric and the received signal strength.

pub mod detector;
pub mod preprocess;
pub mod sequence;
pub mod synth;
pub mod tables;
pub mod window;

// Re-export commonly used types
pub use detector::{PrachDetector, PrachDetectionResult};
pub use window::WindowInfo;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// PRACH constants according to 3GPP
pub mod constants {
    /// Long sequence length (for formats 0-3)
    pub const LONG_SEQUENCE_LENGTH: usize = 839;
    /// Short sequence length (for formats A1-C2)
    pub const SHORT_SEQUENCE_LENGTH: usize = 139;
    /// Maximum number of preambles
    pub const MAX_NUM_PREAMBLES: usize = 64;
    /// Delay-domain DFT size used by the detector for long formats
    pub const LONG_DFT_SIZE: usize = 1024;
    /// Delay-domain DFT size used by the detector for short formats
    pub const SHORT_DFT_SIZE: usize = 256;
}

/// PRACH preamble format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PreambleFormat {
    /// Format 0: 839 sequence length, 1 ms duration
    #[serde(rename = "0")]
    Format0,
    /// Format 1: 839 sequence length, 2 ms duration
    #[serde(rename = "1")]
    Format1,
    /// Format 2: 839 sequence length, 4 ms duration
    #[serde(rename = "2")]
    Format2,
    /// Format 3: 839 sequence length, 4 ms duration
    #[serde(rename = "3")]
    Format3,
    /// Format A1: 139 sequence length (short)
    #[serde(rename = "A1")]
    FormatA1,
    /// Format A2: 139 sequence length (short)
    #[serde(rename = "A2")]
    FormatA2,
    /// Format A3: 139 sequence length (short)
    #[serde(rename = "A3")]
    FormatA3,
    /// Format B1: 139 sequence length (short)
    #[serde(rename = "B1")]
    FormatB1,
    /// Format B2: 139 sequence length (short)
    #[serde(rename = "B2")]
    FormatB2,
    /// Format B3: 139 sequence length (short)
    #[serde(rename = "B3")]
    FormatB3,
    /// Format B4: 139 sequence length (short)
    #[serde(rename = "B4")]
    FormatB4,
    /// Format C0: 139 sequence length (short)
    #[serde(rename = "C0")]
    FormatC0,
    /// Format C2: 139 sequence length (short)
    #[serde(rename = "C2")]
    FormatC2,
}

impl PreambleFormat {
    /// Check if this is a long preamble format
    pub fn is_long(&self) -> bool {
        matches!(
            self,
            Self::Format0 | Self::Format1 | Self::Format2 | Self::Format3
        )
    }

    /// Get the sequence length L_RA for this format
    pub fn sequence_length(&self) -> usize {
        if self.is_long() {
            constants::LONG_SEQUENCE_LENGTH
        } else {
            constants::SHORT_SEQUENCE_LENGTH
        }
    }

    /// Get the delay-domain DFT size the detector uses for this format
    pub fn dft_size(&self) -> usize {
        if self.is_long() {
            constants::LONG_DFT_SIZE
        } else {
            constants::SHORT_DFT_SIZE
        }
    }

    /// Default PRACH subcarrier spacing for this format
    pub fn default_subcarrier_spacing(&self) -> PrachSubcarrierSpacing {
        match self {
            Self::Format0 | Self::Format1 | Self::Format2 => PrachSubcarrierSpacing::Khz1_25,
            Self::Format3 => PrachSubcarrierSpacing::Khz5,
            _ => PrachSubcarrierSpacing::Khz15,
        }
    }
}

impl fmt::Display for PreambleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Format0 => "0",
            Self::Format1 => "1",
            Self::Format2 => "2",
            Self::Format3 => "3",
            Self::FormatA1 => "A1",
            Self::FormatA2 => "A2",
            Self::FormatA3 => "A3",
            Self::FormatB1 => "B1",
            Self::FormatB2 => "B2",
            Self::FormatB3 => "B3",
            Self::FormatB4 => "B4",
            Self::FormatC0 => "C0",
            Self::FormatC2 => "C2",
        };
        f.write_str(tag)
    }
}

impl FromStr for PreambleFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" => Ok(Self::Format0),
            "1" => Ok(Self::Format1),
            "2" => Ok(Self::Format2),
            "3" => Ok(Self::Format3),
            "A1" => Ok(Self::FormatA1),
            "A2" => Ok(Self::FormatA2),
            "A3" => Ok(Self::FormatA3),
            "B1" => Ok(Self::FormatB1),
            "B2" => Ok(Self::FormatB2),
            "B3" => Ok(Self::FormatB3),
            "B4" => Ok(Self::FormatB4),
            "C0" => Ok(Self::FormatC0),
            "C2" => Ok(Self::FormatC2),
            _ => Err(format!("unknown preamble format: {s}")),
        }
    }
}

/// Restricted set configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestrictedSetConfig {
    UnrestrictedSet,
    RestrictedSetTypeA,
    RestrictedSetTypeB,
}

/// PRACH subcarrier spacing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrachSubcarrierSpacing {
    /// 1.25 kHz (long formats 0-2)
    Khz1_25,
    /// 5 kHz (long format 3)
    Khz5,
    /// 15 kHz (short formats)
    Khz15,
    /// 30 kHz (short formats)
    Khz30,
    /// 60 kHz (short formats)
    Khz60,
    /// 120 kHz (short formats)
    Khz120,
}

impl PrachSubcarrierSpacing {
    /// Get the PRACH subcarrier spacing in Hz
    pub fn as_hz(&self) -> f64 {
        match self {
            Self::Khz1_25 => 1_250.0,
            Self::Khz5 => 5_000.0,
            Self::Khz15 => 15_000.0,
            Self::Khz30 => 30_000.0,
            Self::Khz60 => 60_000.0,
            Self::Khz120 => 120_000.0,
        }
    }
}

/// PRACH configuration for one occasion
///
/// The fields are trusted to be internally consistent; validation happens in
/// the configuration layer that produces them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrachConfig {
    /// Preamble format
    pub format: PreambleFormat,
    /// PRACH subcarrier spacing
    pub subcarrier_spacing: PrachSubcarrierSpacing,
    /// Sequence length L_RA (839 for long formats, 139 for short formats)
    pub lra: usize,
    /// Restricted set configuration
    pub restricted_set: RestrictedSetConfig,
    /// Zero correlation zone configuration index (0-15)
    pub zero_correlation_zone: u8,
    /// Logical root sequence index
    pub sequence_index: u16,
}

impl PrachConfig {
    /// Create a configuration with format-consistent defaults
    pub fn new(format: PreambleFormat, zero_correlation_zone: u8, sequence_index: u16) -> Self {
        Self {
            format,
            subcarrier_spacing: format.default_subcarrier_spacing(),
            lra: format.sequence_length(),
            restricted_set: RestrictedSetConfig::UnrestrictedSet,
            zero_correlation_zone,
            sequence_index,
        }
    }

    /// PRACH sampling rate L_RA * SCS in Hz
    pub fn sample_rate_hz(&self) -> f64 {
        self.lra as f64 * self.subcarrier_spacing.as_hz()
    }
}
