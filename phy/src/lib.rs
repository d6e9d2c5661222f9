//! Physical Layer Processing Library
//!
//! This crate implements the uplink Random Access preamble detector used to
//! exercise a 5G NR physical-layer stack, according to 3GPP TS 38.211.

pub mod prach;

use thiserror::Error;

/// Common errors for physical-layer processing
#[derive(Error, Debug)]
pub enum PhyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Restricted set {0:?} is not supported, only the unrestricted set is")]
    UnsupportedRestrictedSet(prach::RestrictedSetConfig),

    #[error("Occasion grid with {rows} rows and {cols} columns does not match sequence length {lra}")]
    ShapeMismatch { rows: usize, cols: usize, lra: usize },

    #[error("Processing error: {0}")]
    ProcessingError(String),
}
