//! Common Types and Utilities
//!
//! This crate provides the numerology types and small numeric helpers shared
//! across the PRACH detection workspace.

pub mod types;
pub mod utils;

// Re-export commonly used items
pub use types::*;
pub use utils::*;
