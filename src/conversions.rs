//! Closed-form conversions between compact-binary mass parameterizations.
//!
//! The sampler works in (chirp mass, mass ratio) coordinates while the
//! waveform model takes component masses, so these inversions sit on the hot
//! path of every likelihood evaluation.

use std::f64::consts::PI;

/// Solar mass expressed in seconds, G M_sun / c^3.
pub const MTSUN_SI: f64 = 4.925491025543576e-6;

/// One megaparsec in meters.
pub const MPC_SI: f64 = 3.0856775814913673e22;

/// Speed of light, m/s.
pub const C_SI: f64 = 299_792_458.0;

/// Primary mass from chirp mass and mass ratio q = m1/m2 >= 1.
///
/// m1 = Mc q^{2/5} (1 + q)^{1/5}
pub fn mass1_from_mchirp_q(mchirp: f64, q: f64) -> f64 {
    mchirp * q.powf(0.4) * (1.0 + q).powf(0.2)
}

/// Secondary mass from chirp mass and mass ratio q = m1/m2 >= 1.
///
/// m2 = Mc q^{-3/5} (1 + q)^{1/5}
pub fn mass2_from_mchirp_q(mchirp: f64, q: f64) -> f64 {
    mchirp * q.powf(-0.6) * (1.0 + q).powf(0.2)
}

/// Chirp mass (m1 m2)^{3/5} / (m1 + m2)^{1/5} from component masses.
pub fn chirp_mass(mass1: f64, mass2: f64) -> f64 {
    (mass1 * mass2).powf(0.6) / (mass1 + mass2).powf(0.2)
}

/// Symmetric mass ratio eta = m1 m2 / (m1 + m2)^2, in (0, 0.25].
pub fn symmetric_mass_ratio(mass1: f64, mass2: f64) -> f64 {
    let mtotal = mass1 + mass2;
    mass1 * mass2 / (mtotal * mtotal)
}

/// Gravitational-wave frequency of the innermost stable circular orbit of a
/// Schwarzschild black hole with the given total mass (solar masses), Hz.
///
/// f_ISCO = c^3 / (6^{3/2} pi G M)
pub fn f_schwarz_isco(mtotal: f64) -> f64 {
    1.0 / (6.0_f64.powf(1.5) * PI * mtotal * MTSUN_SI)
}
