//! PRACH occasion preprocessing
//!
//! Reshapes the captured occasion into one column per preamble replica and
//! antenna. When the caller asserts that no residual carrier frequency offset
//! is present, replicas are averaged coherently per antenna, trading CFO
//! robustness for noise reduction.

use crate::PhyError;
use ndarray::{Array2, Array3};
use num_complex::Complex32;
use num_traits::Zero;
use tracing::trace;

/// Reshape one PRACH occasion into the correlator input matrix
///
/// The input grid holds `L_RA * replicas` rows and one column per antenna.
/// The output has `L_RA` rows and either one column per antenna (replicas
/// averaged, `ignore_cfo` true) or one column per replica and antenna.
pub fn preprocess(
    occasion: &Array2<Complex32>,
    lra: usize,
    ignore_cfo: bool,
) -> Result<Array2<Complex32>, PhyError> {
    let rows = occasion.nrows();
    let n_antennas = occasion.ncols();
    if rows == 0 || n_antennas == 0 || rows % lra != 0 {
        return Err(PhyError::ShapeMismatch {
            rows,
            cols: n_antennas,
            lra,
        });
    }
    let replicas = rows / lra;

    // Explicit [L_RA, replicas, antennas] view of the occasion
    let mut cube = Array3::<Complex32>::zeros((lra, replicas, n_antennas));
    for ant in 0..n_antennas {
        for rep in 0..replicas {
            for i in 0..lra {
                cube[[i, rep, ant]] = occasion[[rep * lra + i, ant]];
            }
        }
    }

    let matrix = if ignore_cfo {
        // Coherent average across replicas, one column per antenna
        let scale = 1.0 / replicas as f32;
        let mut averaged = Array2::<Complex32>::zeros((lra, n_antennas));
        for ant in 0..n_antennas {
            for i in 0..lra {
                let mut acc = Complex32::zero();
                for rep in 0..replicas {
                    acc += cube[[i, rep, ant]];
                }
                averaged[[i, ant]] = acc * scale;
            }
        }
        averaged
    } else {
        // Every replica keeps its own column
        let mut expanded = Array2::<Complex32>::zeros((lra, replicas * n_antennas));
        for ant in 0..n_antennas {
            for rep in 0..replicas {
                for i in 0..lra {
                    expanded[[i, ant * replicas + rep]] = cube[[i, rep, ant]];
                }
            }
        }
        expanded
    };

    trace!(
        "preprocessed occasion: {} replicas, {} antennas -> {} columns",
        replicas,
        n_antennas,
        matrix.ncols()
    );
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn ramp_grid(lra: usize, replicas: usize, antennas: usize) -> Array2<Complex32> {
        Array2::from_shape_fn((lra * replicas, antennas), |(row, col)| {
            Complex32::new(row as f32, col as f32)
        })
    }

    #[test]
    fn test_rejects_partial_replicas() {
        let grid = Array2::<Complex32>::zeros((140, 1));
        let err = preprocess(&grid, 139, false).unwrap_err();
        assert!(matches!(err, PhyError::ShapeMismatch { rows: 140, .. }));
    }

    #[test]
    fn test_rejects_empty_grid() {
        let grid = Array2::<Complex32>::zeros((0, 1));
        assert!(preprocess(&grid, 139, false).is_err());
        let grid = Array2::<Complex32>::zeros((139, 0));
        assert!(preprocess(&grid, 139, true).is_err());
    }

    #[test]
    fn test_replica_columns_kept_without_averaging() {
        let grid = ramp_grid(4, 3, 2);
        let matrix = preprocess(&grid, 4, false).unwrap();
        assert_eq!(matrix.dim(), (4, 6));
        // Column 1 is the second replica of antenna 0
        assert_eq!(matrix[[0, 1]], Complex32::new(4.0, 0.0));
        // Column 3 is the first replica of antenna 1
        assert_eq!(matrix[[2, 3]], Complex32::new(2.0, 1.0));
    }

    #[test]
    fn test_replicas_averaged_per_antenna() {
        let grid = ramp_grid(4, 3, 2);
        let matrix = preprocess(&grid, 4, true).unwrap();
        assert_eq!(matrix.dim(), (4, 2));
        // Rows 0, 4 and 8 of antenna 0 average to 4
        assert_eq!(matrix[[0, 0]], Complex32::new(4.0, 0.0));
        assert_eq!(matrix[[3, 1]], Complex32::new(7.0, 1.0));
    }

    #[test]
    fn test_single_replica_passthrough() {
        let grid = ramp_grid(8, 1, 1);
        let averaged = preprocess(&grid, 8, true).unwrap();
        let kept = preprocess(&grid, 8, false).unwrap();
        assert_eq!(averaged, kept);
    }
}
