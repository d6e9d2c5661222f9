//! PRACH occasion synthesis
//!
//! Builds occasion grids containing one ideal preamble at a chosen cyclic
//! shift and timing offset. The timing offset is emulated as a phase ramp
//! over the centred spectrum, matching the delay convention of the detector.
//! Used by the link-level bench and the conformance tests; not part of the
//! detection contract.

use super::{detector::dft_bin, sequence, window::WindowInfo, PrachConfig};
use crate::PhyError;
use ndarray::Array2;
use num_complex::Complex32;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Synthesize a noiseless occasion carrying one preamble
///
/// The preamble is delayed by `delay_bins` delay-domain bins (the detector's
/// time resolution) on top of its cyclic-shift position, then replicated
/// over `replicas` repetitions and `n_antennas` antennas.
pub fn synthesize_occasion(
    config: &PrachConfig,
    mu: u32,
    preamble_index: usize,
    delay_bins: f64,
    replicas: usize,
    n_antennas: usize,
) -> Result<Array2<Complex32>, PhyError> {
    if replicas == 0 || n_antennas == 0 {
        return Err(PhyError::InvalidConfiguration(
            "occasion needs at least one replica and one antenna".to_string(),
        ));
    }

    let windows = WindowInfo::compute(config, mu)?;
    let shift = preamble_index % windows.n_shifts;
    let root = sequence::root_sequence(config, preamble_index)?;

    let lra = config.lra;
    let n = config.format.dft_size();
    // Cyclic-shift position expressed in delay-domain bins
    let total_delay = shift as f64 * windows.ncs as f64 * n as f64 / lra as f64 + delay_bins;

    let mut grid = Array2::<Complex32>::zeros((lra * replicas, n_antennas));
    for (i, ideal) in root.iter().enumerate() {
        let bin = dft_bin(i, lra, n);
        let phase = -2.0 * std::f64::consts::PI * bin as f64 * total_delay / n as f64;
        let value = ideal * Complex32::from_polar(1.0, phase as f32);
        for ant in 0..n_antennas {
            for rep in 0..replicas {
                grid[[rep * lra + i, ant]] = value;
            }
        }
    }

    Ok(grid)
}

/// Add complex white Gaussian noise of the given per-sample power
pub fn add_noise<R: Rng>(grid: &mut Array2<Complex32>, noise_power: f32, rng: &mut R) {
    let sigma = (noise_power.max(0.0) / 2.0).sqrt();
    let normal = Normal::new(0.0f32, sigma).expect("valid noise deviation");
    for value in grid.iter_mut() {
        *value += Complex32::new(normal.sample(rng), normal.sample(rng));
    }
}
