//! PRACH detection window geometry
//!
//! Derives, from a PRACH configuration and the carrier numerology, how the 64
//! candidate preambles map onto root sequences and cyclic-shift windows.

use super::{constants, tables, PrachConfig};
use crate::PhyError;

/// Cyclic-shift window layout for one PRACH configuration
///
/// Computed once per detector and immutable afterwards. All widths and start
/// offsets are expressed in samples at the L_RA rate.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowInfo {
    /// Cyclic shift spacing N_CS (0 means a single shift covers all preambles)
    pub ncs: u16,
    /// Number of cyclic-shift preambles sharing one root sequence
    pub n_shifts: usize,
    /// Number of root sequences needed to cover all 64 preambles
    pub n_sequences: usize,
    /// Detection window width for each shift
    pub win_widths: Vec<usize>,
    /// Detection window start offset for each shift
    pub win_starts: Vec<usize>,
}

impl WindowInfo {
    /// Compute the window layout for a configuration and numerology mu
    pub fn compute(config: &PrachConfig, mu: u32) -> Result<Self, PhyError> {
        let ncs = tables::ncs(config)?;
        let lra = config.lra;

        let (n_shifts, n_sequences) = if ncs == 0 {
            (1, constants::MAX_NUM_PREAMBLES)
        } else {
            let shifts = lra / ncs as usize;
            let sequences = (constants::MAX_NUM_PREAMBLES + shifts - 1) / shifts;
            (shifts, sequences)
        };

        let cp_samples = tables::cp_length_samples(config, mu);
        let width = if ncs == 0 {
            cp_samples
        } else {
            cp_samples.min(ncs as usize)
        };

        Ok(Self {
            ncs,
            n_shifts,
            n_sequences,
            win_widths: vec![width; n_shifts],
            win_starts: (0..n_shifts).map(|i| i * ncs as usize).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prach::PreambleFormat;

    #[test]
    fn test_single_shift_layout() {
        // Format 0 with ZCZ 0: one full-width window per root sequence and a
        // distinct root sequence per preamble.
        let config = PrachConfig::new(PreambleFormat::Format0, 0, 0);
        let info = WindowInfo::compute(&config, 0).unwrap();
        assert_eq!(info.ncs, 0);
        assert_eq!(info.n_shifts, 1);
        assert_eq!(info.n_sequences, 64);
        assert_eq!(info.win_widths, vec![108]);
        assert_eq!(info.win_starts, vec![0]);
    }

    #[test]
    fn test_multi_shift_layout() {
        // Format 0 with ZCZ 12: N_CS 119, 7 shifts, 10 root sequences
        let config = PrachConfig::new(PreambleFormat::Format0, 12, 0);
        let info = WindowInfo::compute(&config, 0).unwrap();
        assert_eq!(info.ncs, 119);
        assert_eq!(info.n_shifts, 7);
        assert_eq!(info.n_sequences, 10);
        // Window width is bounded by the cyclic prefix
        assert_eq!(info.win_widths, vec![108; 7]);
        assert_eq!(info.win_starts, vec![0, 119, 238, 357, 476, 595, 714]);
    }

    #[test]
    fn test_windows_cover_exactly_64_preambles() {
        for zcz in 0..16u8 {
            let config = PrachConfig::new(PreambleFormat::FormatA1, zcz, 0);
            let info = WindowInfo::compute(&config, 0).unwrap();
            let mut remaining = 64usize;
            let mut consumed = 0usize;
            for _ in 0..info.n_sequences {
                let windows = info.n_shifts.min(remaining);
                consumed += windows;
                remaining -= windows;
            }
            assert_eq!(consumed, 64, "ZCZ {zcz}");
            assert_eq!(remaining, 0, "ZCZ {zcz}");
        }
    }

    #[test]
    fn test_shift_count_may_exceed_preamble_count() {
        // Short preamble with N_CS 2 yields 69 shifts; a single root sequence
        // covers all 64 preambles.
        let config = PrachConfig::new(PreambleFormat::FormatA1, 1, 0);
        let info = WindowInfo::compute(&config, 0).unwrap();
        assert_eq!(info.n_shifts, 69);
        assert_eq!(info.n_sequences, 1);
    }
}
