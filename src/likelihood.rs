//! Phase-marginalized frequency-domain Gaussian-noise likelihood.
//!
//! For each detector the model strain is the TaylorF2 carrier scaled by the
//! antenna response and shifted to the detector arrival time. With the
//! coalescence phase marginalized analytically, the log-likelihood-ratio is
//!
//! ```text
//! ln L / L_noise = ln I0(|sum_det <h, d>|) - 1/2 sum_det <h, h>
//! ```
//!
//! with the noise-weighted inner product
//! `<a, b> = 4 delta_f Re sum a* b / S_n` over the analysis band.
//!
//! The likelihood is a plain request/response object: parameters in, scalar
//! out, no interior mutability, so one instance can be shared across worker
//! threads.

use std::f64::consts::TAU;

use num_complex::Complex64;

use crate::conversions::{mass1_from_mchirp_q, mass2_from_mchirp_q};
use crate::detector::Detector;
use crate::error::PeError;
use crate::special::ln_i0;
use crate::strain::DetectorStrain;
use crate::waveform::{TaylorF2, WaveformParams, polarization_factors};

/// Physical parameter point scored by the likelihood.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SourceParams {
    pub mass1: f64,
    pub mass2: f64,
    pub spin1z: f64,
    pub spin2z: f64,
    pub inclination: f64,
    /// Luminosity distance, Mpc.
    pub distance: f64,
    /// Geocentric coalescence time, GPS seconds.
    pub tc: f64,
}

impl SourceParams {
    /// Build from a sampled point in (chirp mass, mass ratio) coordinates:
    /// `[mchirp, mass_ratio, s1z, s2z, inclination, distance, tc]`.
    pub fn from_chirp_coords(theta: &[f64]) -> Self {
        let &[mchirp, mass_ratio, spin1z, spin2z, inclination, distance, tc] = theta else {
            panic!("expected 7 sampled parameters, got {}", theta.len());
        };
        Self {
            mass1: mass1_from_mchirp_q(mchirp, mass_ratio),
            mass2: mass2_from_mchirp_q(mchirp, mass_ratio),
            spin1z,
            spin2z,
            inclination,
            distance,
            tc,
        }
    }
}

/// Fixed extrinsic parameters of the analysis.
#[derive(Clone, Copy, Debug)]
pub struct SkyLocation {
    pub ra: f64,
    pub dec: f64,
    pub polarization: f64,
}

struct ConditionedDetector {
    /// Frequency-domain data restricted to the analysis band.
    data: Vec<Complex64>,
    /// `4 delta_f / S_n` weights on the same band.
    weight: Vec<f64>,
    fplus: f64,
    fcross: f64,
    /// Geocenter-to-detector delay plus the segment epoch offset.
    time_offset: f64,
}

pub struct PhaseMarginalizedLikelihood {
    detectors: Vec<ConditionedDetector>,
    kmin: usize,
    kmax: usize,
    delta_f: f64,
}

impl PhaseMarginalizedLikelihood {
    /// Condition the detector data for likelihood evaluation. Antenna
    /// responses and geocenter delays are frozen at the trigger time; the
    /// coalescence-time prior is narrow enough that their variation is far
    /// below numerical relevance.
    pub fn new(
        data: Vec<DetectorStrain>,
        sky: SkyLocation,
        trigger_time: f64,
        f_low: f64,
        f_high: f64,
    ) -> Result<Self, PeError> {
        let first = data
            .first()
            .ok_or_else(|| PeError::InvalidConfig("no detector data supplied".into()))?;
        let delta_f = first.delta_f;

        let kmin = (f_low / delta_f).ceil() as usize;
        let kmax = (f_high / delta_f).floor() as usize;
        if kmin == 0 || kmin >= kmax {
            return Err(PeError::InvalidConfig(format!(
                "empty analysis band [{f_low}, {f_high}] Hz at delta_f = {delta_f} Hz"
            )));
        }

        let mut detectors = Vec::with_capacity(data.len());
        for d in &data {
            if (d.delta_f - delta_f).abs() > 1e-12 * delta_f {
                return Err(PeError::InvalidConfig(format!(
                    "{}: frequency resolution {} differs from {}",
                    d.ifo, d.delta_f, delta_f
                )));
            }
            if d.stilde.len() <= kmax {
                return Err(PeError::InvalidConfig(format!(
                    "{}: high-frequency cutoff {f_high} Hz beyond Nyquist",
                    d.ifo
                )));
            }
            let site = Detector::by_name(&d.ifo).ok_or_else(|| {
                PeError::InvalidConfig(format!("unknown interferometer `{}`", d.ifo))
            })?;

            let (fplus, fcross) =
                site.antenna_pattern(sky.ra, sky.dec, sky.polarization, trigger_time);
            let delay = site.time_delay_from_earth_center(sky.ra, sky.dec, trigger_time);

            let band = kmin..=kmax;
            let weight = d.psd.slice(ndarray::s![band.clone()]);
            if weight.iter().any(|&s| !(s.is_finite() && s > 0.0)) {
                return Err(PeError::InvalidConfig(format!(
                    "{}: PSD must be positive and finite across the band",
                    d.ifo
                )));
            }

            detectors.push(ConditionedDetector {
                data: d.stilde.slice(ndarray::s![band]).to_vec(),
                weight: weight.iter().map(|&s| 4.0 * delta_f / s).collect(),
                fplus,
                fcross,
                time_offset: delay - d.epoch,
            });
        }

        Ok(Self {
            detectors,
            kmin,
            kmax,
            delta_f,
        })
    }

    pub fn band(&self) -> (f64, f64) {
        (
            self.kmin as f64 * self.delta_f,
            self.kmax as f64 * self.delta_f,
        )
    }

    /// Phase-marginalized log-likelihood-ratio at the given point.
    pub fn loglr(&self, p: &SourceParams) -> f64 {
        let carrier = TaylorF2::new(&WaveformParams {
            mass1: p.mass1,
            mass2: p.mass2,
            spin1z: p.spin1z,
            spin2z: p.spin2z,
            distance: p.distance,
        })
        .band(self.kmin, self.kmax, self.delta_f);
        let (plus, cross) = polarization_factors(p.inclination);

        let mut hd = Complex64::ZERO;
        let mut hh = 0.0;
        for det in &self.detectors {
            // complex response collapses both polarizations of the dominant
            // mode into a single factor on the carrier
            let response = Complex64::new(det.fplus * plus, det.fcross * cross);
            let arrival = p.tc + det.time_offset;

            let mut hd_det = Complex64::ZERO;
            let mut hh_det = 0.0;
            for (k, (base, &d, &w)) in
                itertools::izip!(carrier.iter(), det.data.iter(), det.weight.iter()).enumerate()
            {
                let f = (self.kmin + k) as f64 * self.delta_f;
                let shift = Complex64::from_polar(1.0, -TAU * f * arrival);
                let h = response * base * shift;
                hd_det += w * h.conj() * d;
                hh_det += w * h.norm_sqr();
            }
            hd += hd_det;
            hh += hh_det;
        }

        ln_i0(hd.norm()) - 0.5 * hh
    }

    /// Model strain for one detector, used to build noise-free injections.
    pub fn detector_waveform(&self, index: usize, p: &SourceParams) -> Vec<Complex64> {
        let det = &self.detectors[index];
        let carrier = TaylorF2::new(&WaveformParams {
            mass1: p.mass1,
            mass2: p.mass2,
            spin1z: p.spin1z,
            spin2z: p.spin2z,
            distance: p.distance,
        })
        .band(self.kmin, self.kmax, self.delta_f);
        let (plus, cross) = polarization_factors(p.inclination);
        let response = Complex64::new(det.fplus * plus, det.fcross * cross);
        let arrival = p.tc + det.time_offset;

        carrier
            .iter()
            .enumerate()
            .map(|(k, base)| {
                let f = (self.kmin + k) as f64 * self.delta_f;
                response * base * Complex64::from_polar(1.0, -TAU * f * arrival)
            })
            .collect()
    }
}
