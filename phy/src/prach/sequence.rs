//! Ideal root sequence generation
//!
//! Produces the Zadoff-Chu root sequence covering a given preamble index,
//! x_u(n) = exp(-j * pi * u * n * (n + 1) / L_RA).

use super::{tables, PrachConfig};
use crate::PhyError;
use num_complex::Complex32;

/// Generate the unit-magnitude root sequence covering `preamble_index`
///
/// Consecutive groups of `n_shifts` preamble indices share one root; the
/// logical root enumeration starts at the configured sequence index.
pub fn root_sequence(config: &PrachConfig, preamble_index: usize) -> Result<Vec<Complex32>, PhyError> {
    let ncs = tables::ncs(config)?;
    let n_shifts = if ncs == 0 {
        1
    } else {
        (config.lra / ncs as usize).max(1)
    };
    let sequence_number = preamble_index / n_shifts;
    let root = physical_root(config.sequence_index as usize, sequence_number, config.lra);
    Ok(zadoff_chu(root, config.lra))
}

/// Map the logical root enumeration onto a physical root index in [1, L_RA - 1]
fn physical_root(sequence_index: usize, sequence_number: usize, lra: usize) -> usize {
    (sequence_index + sequence_number) % (lra - 1) + 1
}

/// Generate a Zadoff-Chu sequence of the given root and length
pub fn zadoff_chu(root: usize, length: usize) -> Vec<Complex32> {
    // u*n*(n+1) overflows f32 precision for large roots; the phase has period
    // 2*length, so reduce in the integer domain first.
    let modulus = 2 * length as u64;
    (0..length)
        .map(|n| {
            let n = n as u64;
            let turns = (root as u64 * n * (n + 1)) % modulus;
            let phase = -std::f64::consts::PI * turns as f64 / length as f64;
            Complex32::from_polar(1.0, phase as f32)
        })
        .collect()
}
