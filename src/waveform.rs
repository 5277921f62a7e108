//! Frequency-domain TaylorF2 inspiral model.
//!
//! Stationary-phase-approximation waveform with 3.5PN point-particle
//! phasing, the leading spin-orbit (1.5PN) and spin-spin (2PN) corrections
//! for aligned spins, and a Newtonian amplitude. Tidal terms are omitted,
//! matching a point-particle analysis of the inspiral band.

use std::f64::consts::PI;

use num_complex::Complex64;

use crate::conversions::{C_SI, MPC_SI, MTSUN_SI, chirp_mass, symmetric_mass_ratio};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Intrinsic and extrinsic parameters needed to generate the waveform.
/// Masses in solar masses, spins dimensionless aligned components, distance
/// in Mpc.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveformParams {
    pub mass1: f64,
    pub mass2: f64,
    pub spin1z: f64,
    pub spin2z: f64,
    pub distance: f64,
}

/// TaylorF2 evaluated on a uniform frequency grid.
pub struct TaylorF2 {
    eta: f64,
    mtotal_s: f64,
    amp0: f64,
    // phasing coefficients of v^k relative to the leading 3/(128 eta v^5)
    pfa: [f64; 8],
    pfl5: f64,
    pfl6: f64,
}

impl TaylorF2 {
    pub fn new(p: &WaveformParams) -> Self {
        let mtotal = p.mass1 + p.mass2;
        let eta = symmetric_mass_ratio(p.mass1, p.mass2);
        let mtotal_s = mtotal * MTSUN_SI;

        let mchirp_s = chirp_mass(p.mass1, p.mass2) * MTSUN_SI;
        let distance_s = p.distance * MPC_SI / C_SI;
        let amp0 =
            (5.0 / 24.0_f64).sqrt() * PI.powf(-2.0 / 3.0) * mchirp_s.powf(5.0 / 6.0) / distance_s;

        let chi_s = 0.5 * (p.spin1z + p.spin2z);
        let chi_a = 0.5 * (p.spin1z - p.spin2z);
        let delta = (p.mass1 - p.mass2) / mtotal;
        // Cutler-Flanagan spin-orbit and Poisson-Will spin-spin couplings
        let beta = (113.0 / 12.0 - 19.0 * eta / 3.0) * chi_s + 113.0 / 12.0 * delta * chi_a;
        let sigma = 79.0 / 8.0 * eta * (chi_s * chi_s - chi_a * chi_a);

        let eta2 = eta * eta;
        let mut pfa = [0.0; 8];
        pfa[0] = 1.0;
        pfa[2] = 3715.0 / 756.0 + 55.0 * eta / 9.0;
        pfa[3] = -16.0 * PI + 4.0 * beta;
        pfa[4] = 15_293_365.0 / 508_032.0 + 27_145.0 * eta / 504.0 + 3085.0 * eta2 / 72.0
            - 10.0 * sigma;
        let pfl5 = 3.0 * PI * (38_645.0 / 756.0 - 65.0 * eta / 9.0);
        pfa[5] = pfl5 / 3.0;
        pfa[6] = 11_583_231_236_531.0 / 4_694_215_680.0
            - 640.0 * PI * PI / 3.0
            - 6848.0 * EULER_GAMMA / 21.0
            - 6848.0 / 21.0 * 4.0_f64.ln()
            + eta * (-15_737_765_635.0 / 3_048_192.0 + 2255.0 * PI * PI / 12.0)
            + 76_055.0 * eta2 / 1728.0
            - 127_825.0 * eta2 * eta / 1296.0;
        let pfl6 = -6848.0 / 21.0;
        pfa[7] = PI * (77_096_675.0 / 254_016.0 + 378_515.0 * eta / 1512.0
            - 74_045.0 * eta2 / 756.0);

        Self {
            eta,
            mtotal_s,
            amp0,
            pfa,
            pfl5,
            pfl6,
        }
    }

    /// Stationary-phase amplitude at frequency f, strain per Hz.
    fn amplitude(&self, f: f64) -> f64 {
        self.amp0 * f.powf(-7.0 / 6.0)
    }

    /// Orbital phase term Psi(f), excluding the coalescence time and phase
    /// which are applied by the caller.
    fn phase(&self, f: f64) -> f64 {
        let v = (PI * self.mtotal_s * f).cbrt();
        let logv = v.ln();
        let v2 = v * v;
        let v3 = v2 * v;
        let v4 = v2 * v2;
        let v5 = v4 * v;
        let v6 = v3 * v3;
        let v7 = v6 * v;

        let series = self.pfa[0]
            + self.pfa[2] * v2
            + self.pfa[3] * v3
            + self.pfa[4] * v4
            + (self.pfa[5] + self.pfl5 * logv) * v5
            + (self.pfa[6] + self.pfl6 * logv) * v6
            + self.pfa[7] * v7;

        3.0 / (128.0 * self.eta * v5) * series - PI / 4.0
    }

    /// `amp0 * f^{-7/6} * exp(i Psi)` for bins `kmin..=kmax` of a grid with
    /// spacing `delta_f`. The returned vector is indexed from `kmin`.
    pub fn band(&self, kmin: usize, kmax: usize, delta_f: f64) -> Vec<Complex64> {
        (kmin..=kmax)
            .map(|k| {
                let f = k as f64 * delta_f;
                Complex64::from_polar(self.amplitude(f), self.phase(f))
            })
            .collect()
    }
}

/// Inclination factors multiplying the carrier for the plus and cross
/// polarizations of the dominant mode.
pub fn polarization_factors(inclination: f64) -> (f64, f64) {
    let ci = inclination.cos();
    (0.5 * (1.0 + ci * ci), ci)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bns_params() -> WaveformParams {
        WaveformParams {
            mass1: 1.46,
            mass2: 1.27,
            spin1z: 0.02,
            spin2z: 0.01,
            distance: 40.0,
        }
    }

    #[test]
    fn amplitude_follows_the_newtonian_slope() {
        let wf = TaylorF2::new(&bns_params());
        let h = wf.band(100, 200, 1.0);
        let ratio = h[100].norm() / h[0].norm();
        assert_relative_eq!(ratio, 2.0_f64.powf(-7.0 / 6.0), max_relative = 1e-12);
    }

    #[test]
    fn amplitude_scales_inversely_with_distance() {
        let near = TaylorF2::new(&bns_params());
        let far = TaylorF2::new(&WaveformParams {
            distance: 80.0,
            ..bns_params()
        });
        let hn = near.band(50, 50, 1.0);
        let hf = far.band(50, 50, 1.0);
        assert_relative_eq!(hn[0].norm(), 2.0 * hf[0].norm(), max_relative = 1e-12);
        // the phase does not depend on the distance
        assert_relative_eq!(hn[0].arg(), hf[0].arg(), max_relative = 1e-9);
    }

    #[test]
    fn strain_magnitude_is_astrophysical() {
        // a binary neutron star at 40 Mpc produces |h~| of order 1e-23 / Hz
        // near 100 Hz
        let wf = TaylorF2::new(&bns_params());
        let h = wf.band(100, 100, 1.0);
        assert!(h[0].norm() > 1e-24 && h[0].norm() < 1e-21);
    }

    #[test]
    fn heavier_systems_accumulate_less_phase() {
        let light = TaylorF2::new(&bns_params());
        let heavy = TaylorF2::new(&WaveformParams {
            mass1: 2.0,
            mass2: 1.8,
            ..bns_params()
        });
        // leading-order phase scales as Mc^{-5/3}
        assert!(light.phase(100.0) > heavy.phase(100.0));
    }

    #[test]
    fn aligned_spin_advances_the_phase() {
        let nospin = TaylorF2::new(&WaveformParams {
            spin1z: 0.0,
            spin2z: 0.0,
            ..bns_params()
        });
        let spinning = TaylorF2::new(&WaveformParams {
            spin1z: 0.05,
            spin2z: 0.05,
            ..bns_params()
        });
        // positive aligned spin gives a positive spin-orbit beta, raising
        // the 1.5PN phasing term
        assert!(spinning.phase(100.0) > nospin.phase(100.0));
    }

    #[test]
    fn polarization_factors_span_inclinations() {
        let (fp, fc) = polarization_factors(0.0);
        assert_relative_eq!(fp, 1.0, max_relative = 1e-12);
        assert_relative_eq!(fc, 1.0, max_relative = 1e-12);
        let (fp, fc) = polarization_factors(std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(fp, 0.5, max_relative = 1e-12);
        assert!(fc.abs() < 1e-12);
    }
}
