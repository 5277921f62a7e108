//! Run configuration.
//!
//! Every analysis setting is a command-line flag, validated up front so a
//! bad value fails at startup instead of deep inside the sampler.

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

use crate::conversions::f_schwarz_isco;
use crate::error::PeError;
use crate::likelihood::SkyLocation;
use crate::prior::PriorBounds;

/// GPS time of the GW170817 merger.
pub const TRIGGER_TIME: f64 = 1_187_008_882.43;

/// Maximum a posteriori total mass (solar masses) used to anchor the
/// high-frequency cutoff.
pub const MAP_TOTAL_MASS: f64 = 2.76;

/// Seismic low-frequency cutoff, Hz.
pub const F_LOW: f64 = 20.0;

/// Interferometers entering the analysis.
pub const IFOS: [&str; 3] = ["L1", "H1", "V1"];

// Fixed-sky median values of the GWTC-1 low-spin samples
const RA: f64 = 3.44616;
const DEC: f64 = -0.408084;
const POLARIZATION: f64 = 0.0;

/// Nested-sampling parameter estimation of GW170817 under the TaylorF2
/// model, with sky location and polarization fixed to their MAP values.
#[derive(Debug, Parser)]
#[command(name = "gw170817-pe", version)]
pub struct Cli {
    /// High-frequency cutoff as a fraction of the Schwarzschild ISCO
    /// frequency of the MAP total mass.
    #[arg(long)]
    pub fisco_fraction: f64,

    /// Worker threads for parallel likelihood evaluation.
    #[arg(long)]
    pub workers: usize,

    /// Directory with `{ifo}_conditioned.npz` inputs.
    #[arg(long, default_value = ".")]
    pub data_dir: PathBuf,

    /// Directory the chain archive is written to.
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Number of live points.
    #[arg(long, default_value_t = 1000)]
    pub nlive: usize,

    /// Evidence tolerance of the stopping criterion.
    #[arg(long, default_value_t = 1e-4)]
    pub dlogz: f64,

    /// Steps per replacement random walk.
    #[arg(long, default_value_t = 40)]
    pub walks: usize,

    /// Seed of the sampler RNG.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Validated analysis settings derived from the command line.
#[derive(Clone, Debug, Serialize)]
pub struct RunConfig {
    pub fisco_fraction: f64,
    pub workers: usize,
    #[serde(skip)]
    pub data_dir: PathBuf,
    #[serde(skip)]
    pub output_dir: PathBuf,
    pub nlive: usize,
    pub dlogz: f64,
    pub walks: usize,
    pub seed: u64,
    pub f_low: f64,
    pub f_high: f64,
    pub trigger_time: f64,
    #[serde(skip)]
    pub sky: SkyLocation,
}

impl Cli {
    pub fn into_config(self) -> Result<RunConfig, PeError> {
        if !(self.fisco_fraction.is_finite() && self.fisco_fraction > 0.0) {
            return Err(PeError::InvalidConfig(format!(
                "fISCO fraction must be a positive number, got {}",
                self.fisco_fraction
            )));
        }
        let f_high = self.fisco_fraction * f_schwarz_isco(MAP_TOTAL_MASS);
        if f_high <= F_LOW {
            return Err(PeError::InvalidConfig(format!(
                "high cutoff {f_high:.1} Hz is below the {F_LOW} Hz seismic cutoff; \
                 raise --fisco-fraction"
            )));
        }
        if self.workers == 0 {
            return Err(PeError::InvalidConfig("--workers must be at least 1".into()));
        }
        if self.nlive < 2 {
            return Err(PeError::InvalidConfig("--nlive must be at least 2".into()));
        }
        if self.walks == 0 {
            return Err(PeError::InvalidConfig("--walks must be at least 1".into()));
        }
        if !(self.dlogz.is_finite() && self.dlogz > 0.0) {
            return Err(PeError::InvalidConfig(format!(
                "--dlogz must be positive, got {}",
                self.dlogz
            )));
        }

        Ok(RunConfig {
            fisco_fraction: self.fisco_fraction,
            workers: self.workers,
            data_dir: self.data_dir,
            output_dir: self.output_dir,
            nlive: self.nlive,
            dlogz: self.dlogz,
            walks: self.walks,
            seed: self.seed,
            f_low: F_LOW,
            f_high,
            trigger_time: TRIGGER_TIME,
            sky: SkyLocation {
                ra: RA,
                dec: DEC,
                polarization: POLARIZATION,
            },
        })
    }
}

impl RunConfig {
    pub fn prior_bounds(&self) -> PriorBounds {
        PriorBounds::gw170817(self.trigger_time)
    }
}
