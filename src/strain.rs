//! Conditioned detector data.
//!
//! Frame reading, high-passing, cropping and PSD estimation happen upstream;
//! this module loads the conditioned per-interferometer products from an
//! `.npz` archive and carries them to frequency domain.
//!
//! Expected arrays in `{ifo}_conditioned.npz`:
//! - `strain`: conditioned time-domain strain, even length
//! - `psd`: one-sided power spectral density on the FFT grid (n/2 + 1 bins)
//! - `delta_t`: one-element array, sample spacing in seconds
//! - `epoch`: one-element array, GPS time of the first strain sample

use std::fs::File;
use std::path::{Path, PathBuf};

use ndarray::Array1;
use ndarray_npy::NpzReader;
use num_complex::Complex64;
use realfft::RealFftPlanner;

use crate::error::PeError;

/// One interferometer's conditioned data in frequency domain.
#[derive(Clone, Debug)]
pub struct DetectorStrain {
    pub ifo: String,
    /// Frequency-domain strain, `n / 2 + 1` bins.
    pub stilde: Array1<Complex64>,
    /// One-sided PSD on the same grid.
    pub psd: Array1<f64>,
    pub delta_f: f64,
    /// GPS time of the first sample of the underlying segment.
    pub epoch: f64,
}

impl DetectorStrain {
    /// Load `{ifo}_conditioned.npz` from `dir`.
    pub fn load(dir: &Path, ifo: &str) -> Result<Self, PeError> {
        let path = dir.join(format!("{ifo}_conditioned.npz"));
        let file = File::open(&path).map_err(|e| PeError::io(&path, e))?;
        let mut npz = NpzReader::new(file)?;

        let strain: Array1<f64> = read_array(&mut npz, &path, "strain")?;
        let psd: Array1<f64> = read_array(&mut npz, &path, "psd")?;
        let delta_t = read_scalar(&mut npz, &path, "delta_t")?;
        let epoch = read_scalar(&mut npz, &path, "epoch")?;

        Self::from_time_domain(ifo, strain, psd, delta_t, epoch).map_err(|reason| {
            PeError::malformed(&path, reason)
        })
    }

    /// Transform a conditioned time-domain segment to frequency domain,
    /// `stilde[k] = delta_t * FFT(strain)[k]`.
    pub fn from_time_domain(
        ifo: &str,
        strain: Array1<f64>,
        psd: Array1<f64>,
        delta_t: f64,
        epoch: f64,
    ) -> Result<Self, String> {
        let n = strain.len();
        if n == 0 || n % 2 != 0 {
            return Err(format!("strain length {n} is not a positive even number"));
        }
        if !(delta_t.is_finite() && delta_t > 0.0) {
            return Err(format!("invalid sample spacing {delta_t}"));
        }
        let nbins = n / 2 + 1;
        if psd.len() != nbins {
            return Err(format!(
                "psd has {} bins, expected n / 2 + 1 = {nbins}",
                psd.len()
            ));
        }

        let mut planner = RealFftPlanner::<f64>::new();
        let r2c = planner.plan_fft_forward(n);
        let mut input = strain.to_vec();
        let mut spectrum = r2c.make_output_vec();
        r2c.process(&mut input, &mut spectrum)
            .map_err(|e| e.to_string())?;

        let stilde = spectrum.into_iter().map(|c| c * delta_t).collect();
        let delta_f = 1.0 / (n as f64 * delta_t);

        Ok(Self {
            ifo: ifo.to_owned(),
            stilde,
            psd,
            delta_f,
            epoch,
        })
    }

    /// Duration of the underlying time segment, seconds.
    pub fn duration(&self) -> f64 {
        1.0 / self.delta_f
    }
}

fn read_array(
    npz: &mut NpzReader<File>,
    path: &Path,
    name: &str,
) -> Result<Array1<f64>, PeError> {
    // numpy's savez stores each member with a `.npy` suffix
    npz.by_name(name)
        .or_else(|_| npz.by_name(&format!("{name}.npy")))
        .map_err(|_| missing(path, name))
}

fn read_scalar(npz: &mut NpzReader<File>, path: &Path, name: &str) -> Result<f64, PeError> {
    let arr = read_array(npz, path, name)?;
    arr.first().copied().ok_or_else(|| missing(path, name))
}

fn missing(path: &Path, name: &str) -> PeError {
    PeError::malformed(
        PathBuf::from(path),
        format!("missing or empty array `{name}`"),
    )
}
