//! Common Numerology Types
//!
//! Defines the carrier-side types consumed by the PRACH detection chain

use num_derive::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

/// Subcarrier spacing values in kHz
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive, Serialize, Deserialize)]
pub enum SubcarrierSpacing {
    /// 15 kHz
    Scs15 = 15,
    /// 30 kHz
    Scs30 = 30,
    /// 60 kHz
    Scs60 = 60,
    /// 120 kHz
    Scs120 = 120,
    /// 240 kHz
    Scs240 = 240,
}

impl SubcarrierSpacing {
    /// Get the subcarrier spacing in Hz
    pub fn as_hz(&self) -> f64 {
        *self as u32 as f64 * 1000.0
    }

    /// Numerology index mu = log2(SCS / 15 kHz)
    pub fn numerology(&self) -> u32 {
        match self {
            SubcarrierSpacing::Scs15 => 0,
            SubcarrierSpacing::Scs30 => 1,
            SubcarrierSpacing::Scs60 => 2,
            SubcarrierSpacing::Scs120 => 3,
            SubcarrierSpacing::Scs240 => 4,
        }
    }

    /// Create from a value in kHz
    pub fn from_khz(khz: u32) -> Option<Self> {
        match khz {
            15 => Some(SubcarrierSpacing::Scs15),
            30 => Some(SubcarrierSpacing::Scs30),
            60 => Some(SubcarrierSpacing::Scs60),
            120 => Some(SubcarrierSpacing::Scs120),
            240 => Some(SubcarrierSpacing::Scs240),
            _ => None,
        }
    }
}

/// Carrier configuration, reduced to what the PRACH chain consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierConfig {
    /// Carrier subcarrier spacing
    pub subcarrier_spacing: SubcarrierSpacing,
}

impl CarrierConfig {
    /// Create a new carrier configuration
    pub fn new(subcarrier_spacing: SubcarrierSpacing) -> Self {
        Self { subcarrier_spacing }
    }

    /// Numerology index of this carrier
    pub fn numerology(&self) -> u32 {
        self.subcarrier_spacing.numerology()
    }
}
