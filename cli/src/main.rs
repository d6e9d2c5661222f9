//! PRACH Detection Bench
//!
//! Synthesizes a PRACH occasion carrying one preamble, optionally adds noise,
//! and runs the preamble detector over it.

mod config;

use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use common::types::{CarrierConfig, SubcarrierSpacing};
use common::utils::db_to_power;
use config::{CarrierSection, OccasionSection, PrachSection, ScenarioConfig};
use phy::prach::{synth, PrachConfig, PrachDetector, PreambleFormat};

/// PRACH preamble detection bench
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML scenario file; overrides the flags below
    #[arg(short, long)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Preamble format ("0"-"3", "A1"-"C2")
    #[arg(long, default_value = "0")]
    format: PreambleFormat,

    /// Zero correlation zone configuration index (0-15)
    #[arg(long, default_value = "1")]
    zcz: u8,

    /// Logical root sequence index
    #[arg(long, default_value = "0")]
    sequence_index: u16,

    /// Preamble index to embed (0-63)
    #[arg(long, default_value = "0")]
    preamble: u8,

    /// Timing offset in delay-domain bins
    #[arg(long, default_value = "0")]
    offset_bins: f64,

    /// SNR in dB; omit for a noiseless occasion
    #[arg(long)]
    snr_db: Option<f32>,

    /// Carrier subcarrier spacing in kHz (15, 30, 60, 120, 240)
    #[arg(long, default_value = "15")]
    scs_khz: u32,

    /// Number of preamble replicas in the occasion
    #[arg(long, default_value = "1")]
    replicas: usize,

    /// Number of receive antennas
    #[arg(long, default_value = "1")]
    antennas: usize,

    /// Average replicas before correlation (assumes no residual CFO)
    #[arg(long)]
    ignore_cfo: bool,

    /// Seed for the noise generator
    #[arg(long, default_value = "0")]
    seed: u64,
}

impl Args {
    fn into_scenario(self) -> Result<ScenarioConfig> {
        if let Some(path) = &self.config {
            return ScenarioConfig::from_file(path);
        }
        Ok(ScenarioConfig {
            carrier: CarrierSection { scs_khz: self.scs_khz },
            prach: PrachSection {
                format: self.format,
                zero_correlation_zone: self.zcz,
                sequence_index: self.sequence_index,
            },
            occasion: OccasionSection {
                preamble_index: self.preamble,
                offset_bins: self.offset_bins,
                snr_db: self.snr_db,
                replicas: self.replicas,
                antennas: self.antennas,
                ignore_cfo: self.ignore_cfo,
                seed: self.seed,
            },
        })
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    fmt().with_env_filter(env_filter).with_target(false).init();

    let scenario = args.into_scenario()?;

    let scs = SubcarrierSpacing::from_khz(scenario.carrier.scs_khz)
        .ok_or_else(|| anyhow::anyhow!("invalid subcarrier spacing: {} kHz", scenario.carrier.scs_khz))?;
    let carrier = CarrierConfig::new(scs);
    let prach = PrachConfig::new(
        scenario.prach.format,
        scenario.prach.zero_correlation_zone,
        scenario.prach.sequence_index,
    );

    info!("Scenario:");
    info!("  Format: {}", prach.format);
    info!("  Zero correlation zone: {}", prach.zero_correlation_zone);
    info!("  Sequence index: {}", prach.sequence_index);
    info!("  Preamble: {}", scenario.occasion.preamble_index);
    info!("  Offset: {} bins", scenario.occasion.offset_bins);
    match scenario.occasion.snr_db {
        Some(snr) => info!("  SNR: {} dB", snr),
        None => info!("  SNR: noiseless"),
    }
    info!(
        "  Occasion: {} replicas x {} antennas, ignore CFO: {}",
        scenario.occasion.replicas, scenario.occasion.antennas, scenario.occasion.ignore_cfo
    );

    let detector = PrachDetector::new(&carrier, prach.clone())?;
    let windows = detector.window_info();
    info!(
        "Window layout: N_CS {}, {} shifts per root sequence, {} root sequences",
        windows.ncs, windows.n_shifts, windows.n_sequences
    );

    let mut occasion = synth::synthesize_occasion(
        &prach,
        carrier.numerology(),
        scenario.occasion.preamble_index as usize,
        scenario.occasion.offset_bins,
        scenario.occasion.replicas,
        scenario.occasion.antennas,
    )?;

    if let Some(snr_db) = scenario.occasion.snr_db {
        let mut rng = StdRng::seed_from_u64(scenario.occasion.seed);
        synth::add_noise(&mut occasion, db_to_power(-snr_db), &mut rng);
    }

    let result = detector.detect(&occasion, scenario.occasion.ignore_cfo)?;

    info!("Detection report:");
    info!("  RSSI: {:.2} dB", result.rssi_db);
    info!("  Time resolution: {:.4} us", result.time_resolution_us);
    info!("  Max offset: {:.4} us", result.max_offset_us);

    if result.num_detected() == 0 {
        warn!("No preambles detected");
    }
    for preamble in result.detections() {
        info!(
            "  Preamble {:2}: offset {:.3} us, metric {:.2} dB",
            preamble,
            result.offsets_us[preamble].unwrap_or_default(),
            result.sinr_db[preamble].unwrap_or_default()
        );
    }

    let embedded = scenario.occasion.preamble_index as usize;
    if result.indices[embedded] {
        info!("Embedded preamble {} detected", embedded);
    } else {
        warn!("Embedded preamble {} missed", embedded);
    }

    Ok(())
}
