//! PRACH calibration tables
//!
//! Static lookup tables from 3GPP TS 38.211: cyclic shift spacing N_CS
//! (Tables 6.3.3.1-5 to 6.3.3.1-7) and cyclic prefix durations
//! (Tables 6.3.3.1-1 and 6.3.3.1-2), plus the detection thresholds and
//! reference-window margins calibrated for the correlator.

use super::{PrachConfig, PreambleFormat, RestrictedSetConfig};
use crate::PhyError;
use tracing::warn;

/// Basic time unit T_c = 1/(480 kHz * 4096) in seconds (TS 38.211 clause 4.1)
pub const TC_SECONDS: f64 = 1.0 / (480_000.0 * 4096.0);

/// Constant kappa = 64 relating the LTE and NR basic time units
pub const KAPPA: f64 = 64.0;

/// N_CS for long preambles with 1.25 kHz SCS, unrestricted set (Table 6.3.3.1-5)
const NCS_LONG_1DOT25_KHZ: [u16; 16] = [
    0, 13, 15, 18, 22, 26, 32, 38, 46, 59, 76, 93, 119, 167, 279, 419,
];

/// N_CS for long preambles with 5 kHz SCS, unrestricted set (Table 6.3.3.1-6)
const NCS_LONG_5_KHZ: [u16; 16] = [
    0, 13, 26, 33, 38, 41, 49, 55, 64, 76, 93, 119, 139, 209, 279, 419,
];

/// N_CS for short preambles, unrestricted set (Table 6.3.3.1-7)
const NCS_SHORT: [u16; 16] = [0, 2, 4, 6, 8, 10, 12, 13, 15, 17, 19, 23, 27, 34, 46, 69];

/// Look up the cyclic shift spacing N_CS for the given configuration
///
/// Fails for restricted sets and for zero-correlation-zone indices outside
/// the table; both are configuration errors.
pub fn ncs(config: &PrachConfig) -> Result<u16, PhyError> {
    if config.restricted_set != RestrictedSetConfig::UnrestrictedSet {
        return Err(PhyError::UnsupportedRestrictedSet(config.restricted_set));
    }

    let table = match config.format {
        PreambleFormat::Format0 | PreambleFormat::Format1 | PreambleFormat::Format2 => {
            &NCS_LONG_1DOT25_KHZ
        }
        PreambleFormat::Format3 => &NCS_LONG_5_KHZ,
        _ => &NCS_SHORT,
    };

    table
        .get(config.zero_correlation_zone as usize)
        .copied()
        .ok_or_else(|| {
            PhyError::InvalidConfiguration(format!(
                "zero correlation zone index {} is not defined for format {}",
                config.zero_correlation_zone, config.format
            ))
        })
}

/// Cyclic prefix duration per format
///
/// Long formats are tabulated in units of kappa, short formats in units of
/// kappa * 2^-mu (Tables 6.3.3.1-1 and 6.3.3.1-2).
fn cp_kappa_units(format: PreambleFormat) -> f64 {
    match format {
        PreambleFormat::Format0 => 3168.0,
        PreambleFormat::Format1 => 21024.0,
        PreambleFormat::Format2 => 4688.0,
        PreambleFormat::Format3 => 3168.0,
        PreambleFormat::FormatA1 => 288.0,
        PreambleFormat::FormatA2 => 576.0,
        PreambleFormat::FormatA3 => 864.0,
        PreambleFormat::FormatB1 => 216.0,
        PreambleFormat::FormatB2 => 360.0,
        PreambleFormat::FormatB3 => 504.0,
        PreambleFormat::FormatB4 => 936.0,
        PreambleFormat::FormatC0 => 1240.0,
        PreambleFormat::FormatC2 => 2048.0,
    }
}

/// Cyclic prefix length in samples at the PRACH sampling rate L_RA * SCS
pub fn cp_length_samples(config: &PrachConfig, mu: u32) -> usize {
    let mut kappa_units = cp_kappa_units(config.format);
    if !config.format.is_long() {
        // Short-format table values scale with the carrier numerology
        kappa_units /= f64::from(1u32 << mu);
    }
    let cp_seconds = kappa_units * KAPPA * TC_SECONDS;
    // Some formats land exactly on an integer sample count; keep rounding
    // noise from pushing the value just below the boundary before flooring.
    (cp_seconds * config.sample_rate_hz() + 1e-9).floor() as usize
}

/// Calibrated detection threshold and reference-window margin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdParams {
    /// Detection threshold applied to the window metric
    pub threshold: f32,
    /// Reference-window margin on each side of a shift window, in delay bins
    pub margin: usize,
}

struct ThresholdEntry {
    antennas: usize,
    long: bool,
    zcz_zero: bool,
    ignore_cfo: bool,
    params: ThresholdParams,
}

const fn entry(
    antennas: usize,
    long: bool,
    zcz_zero: bool,
    ignore_cfo: bool,
    threshold: f32,
    margin: usize,
) -> ThresholdEntry {
    ThresholdEntry {
        antennas,
        long,
        zcz_zero,
        ignore_cfo,
        params: ThresholdParams { threshold, margin },
    }
}

/// Thresholds calibrated by noise-only simulation per antenna count, format
/// class, zero-correlation-zone class and CFO assumption
const THRESHOLDS: [ThresholdEntry; 24] = [
    entry(1, true, false, false, 2.10, 12),
    entry(1, true, false, true, 2.35, 12),
    entry(1, true, true, false, 0.48, 40),
    entry(1, true, true, true, 0.52, 40),
    entry(1, false, false, false, 0.90, 45),
    entry(1, false, false, true, 1.00, 45),
    entry(1, false, true, false, 0.80, 110),
    entry(1, false, true, true, 0.85, 110),
    entry(2, true, false, false, 1.72, 12),
    entry(2, true, false, true, 1.90, 12),
    entry(2, true, true, false, 0.39, 40),
    entry(2, true, true, true, 0.43, 40),
    entry(2, false, false, false, 0.75, 45),
    entry(2, false, false, true, 0.82, 45),
    entry(2, false, true, false, 0.66, 110),
    entry(2, false, true, true, 0.70, 110),
    entry(4, true, false, false, 1.41, 12),
    entry(4, true, false, true, 1.55, 12),
    entry(4, true, true, false, 0.32, 40),
    entry(4, true, true, true, 0.35, 40),
    entry(4, false, false, false, 0.62, 45),
    entry(4, false, false, true, 0.68, 45),
    entry(4, false, true, false, 0.54, 110),
    entry(4, false, true, true, 0.58, 110),
];

/// Conservative defaults for configurations without a calibrated entry
fn fallback(long: bool, zcz_zero: bool) -> ThresholdParams {
    match (long, zcz_zero) {
        (true, false) => ThresholdParams { threshold: 2.60, margin: 12 },
        (true, true) => ThresholdParams { threshold: 0.60, margin: 40 },
        (false, false) => ThresholdParams { threshold: 1.15, margin: 45 },
        (false, true) => ThresholdParams { threshold: 1.00, margin: 110 },
    }
}

/// Look up the detection threshold and margin for a configuration
///
/// A missing entry is not an error: detection continues with a conservative
/// per-class default and a warning.
pub fn threshold(antennas: usize, long: bool, zcz_zero: bool, ignore_cfo: bool) -> ThresholdParams {
    for entry in THRESHOLDS.iter() {
        if entry.antennas == antennas
            && entry.long == long
            && entry.zcz_zero == zcz_zero
            && entry.ignore_cfo == ignore_cfo
        {
            return entry.params;
        }
    }
    let params = fallback(long, zcz_zero);
    warn!(
        "no calibrated detection threshold for {} antennas ({} format, ZCZ {}, ignore CFO {}), using conservative default {:.2}",
        antennas,
        if long { "long" } else { "short" },
        if zcz_zero { "zero" } else { "non-zero" },
        ignore_cfo,
        params.threshold
    );
    params
}
