//! Common Numeric Utilities
//!
//! Provides power and decibel helpers used across the workspace

use num_complex::Complex32;

/// Convert a linear power ratio to decibels
pub fn power_to_db(power: f32) -> f32 {
    10.0 * power.log10()
}

/// Convert decibels to a linear power ratio
pub fn db_to_power(db: f32) -> f32 {
    10.0_f32.powf(db / 10.0)
}

/// Convert decibels to a linear amplitude
pub fn db_to_amplitude(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Mean power of a block of complex samples
pub fn mean_power(samples: &[Complex32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|s| s.norm_sqr()).sum::<f32>() / samples.len() as f32
}
