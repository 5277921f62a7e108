//! Prior distributions and the unit-cube transform handed to the nested
//! sampler.
//!
//! Sampled coordinates, in order: chirp mass, mass ratio, spin1z, spin2z,
//! inclination, luminosity distance, coalescence time. Each marginal is an
//! independent inverse CDF, so the transform maps `[0, 1)^7` onto the
//! declared bounds monotonically.

use serde::Serialize;

use crate::error::PeError;

/// Dimensionality of the sampled parameter space.
pub const NDIM: usize = 7;

/// Names of the sampled coordinates, in sampling order.
pub const PARAM_NAMES: [&str; NDIM] = [
    "mchirp",
    "mass_ratio",
    "s1z",
    "s2z",
    "iota",
    "distance",
    "tc",
];

/// Bounds of the non-angular parameters. Inclination needs none: it covers
/// the full isotropic range through the arccos transform.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct PriorBounds {
    pub mchirp: (f64, f64),
    pub mass_ratio: (f64, f64),
    pub spin1z: (f64, f64),
    pub spin2z: (f64, f64),
    pub distance: (f64, f64),
    pub tc: (f64, f64),
}

impl PriorBounds {
    /// The GW170817 low-spin analysis block: a narrow chirp-mass window
    /// around the search point, mass ratio up to 1.7, spins below 0.05 and
    /// the EM-counterpart-informed distance range.
    pub fn gw170817(trigger_time: f64) -> Self {
        Self {
            mchirp: (1.197, 1.198),
            mass_ratio: (1.0, 1.7),
            spin1z: (0.0, 0.05),
            spin2z: (0.0, 0.05),
            distance: (12.0, 53.0),
            tc: (trigger_time - 0.15, trigger_time + 0.15),
        }
    }

    fn validate(&self) -> Result<(), String> {
        let pairs = [
            ("mchirp", self.mchirp),
            ("mass_ratio", self.mass_ratio),
            ("spin1z", self.spin1z),
            ("spin2z", self.spin2z),
            ("distance", self.distance),
            ("tc", self.tc),
        ];
        for (name, (lo, hi)) in pairs {
            if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                return Err(format!("{name} bounds ({lo}, {hi}) are not an interval"));
            }
        }
        if self.mchirp.0 <= 0.0 {
            return Err("chirp mass must be positive".into());
        }
        if self.mass_ratio.0 < 1.0 {
            return Err("mass ratio uses the m1/m2 >= 1 convention".into());
        }
        if self.distance.0 <= 0.0 {
            return Err("distance must be positive".into());
        }
        Ok(())
    }
}

/// Inverse-CDF transform from the unit hypercube to physical parameters.
///
/// Marginals: chirp mass with density proportional to mc, mass ratio
/// uniform in component masses, uniform spins, isotropic inclination,
/// uniform-in-volume distance, uniform coalescence time.
pub struct PriorTransform {
    bounds: PriorBounds,
    mass_ratio_cdf: MassRatioInvCdf,
}

impl PriorTransform {
    pub fn new(bounds: PriorBounds) -> Result<Self, PeError> {
        bounds.validate().map_err(PeError::InvalidConfig)?;
        Ok(Self {
            mass_ratio_cdf: MassRatioInvCdf::new(bounds.mass_ratio.0, bounds.mass_ratio.1),
            bounds,
        })
    }

    pub fn bounds(&self) -> &PriorBounds {
        &self.bounds
    }

    /// Map a point of `[0, 1)^7` to physical parameters.
    pub fn transform(&self, cube: &[f64; NDIM]) -> [f64; NDIM] {
        let b = &self.bounds;
        let (mc_lo, mc_hi) = b.mchirp;
        let (d_lo, d_hi) = b.distance;

        [
            // p(mc) ~ mc: inverse CDF of the mc^1 power law
            ((mc_hi * mc_hi - mc_lo * mc_lo) * cube[0] + mc_lo * mc_lo).sqrt(),
            self.mass_ratio_cdf.inverse(cube[1]),
            b.spin1z.0 + (b.spin1z.1 - b.spin1z.0) * cube[2],
            b.spin2z.0 + (b.spin2z.1 - b.spin2z.0) * cube[3],
            // isotropic in cos(iota)
            (2.0 * cube[4] - 1.0).acos(),
            // uniform in d^3
            ((d_hi.powi(3) - d_lo.powi(3)) * cube[5] + d_lo.powi(3)).cbrt(),
            b.tc.0 + (b.tc.1 - b.tc.0) * cube[6],
        ]
    }
}

/// Tabulated inverse CDF of the mass-ratio marginal of a prior uniform in
/// both component masses, reparameterized to (chirp mass, mass ratio):
/// the Jacobian gives `p(q) ~ ((1 + q) / q^3)^(2/5)` on `[q_min, q_max]`.
///
/// The CDF has no closed form, so it is accumulated by the trapezoid rule
/// on a dense grid and inverted by binary search with linear interpolation;
/// the result is monotone by construction.
struct MassRatioInvCdf {
    q: Vec<f64>,
    cdf: Vec<f64>,
}

impl MassRatioInvCdf {
    const GRID: usize = 4097;

    fn new(q_min: f64, q_max: f64) -> Self {
        let pdf = |q: f64| ((1.0 + q) / q.powi(3)).powf(0.4);

        let n = Self::GRID;
        let dq = (q_max - q_min) / (n - 1) as f64;
        let q: Vec<f64> = (0..n).map(|i| q_min + i as f64 * dq).collect();

        let mut cdf = Vec::with_capacity(n);
        cdf.push(0.0);
        let mut acc = 0.0;
        for i in 1..n {
            acc += 0.5 * dq * (pdf(q[i - 1]) + pdf(q[i]));
            cdf.push(acc);
        }
        let norm = cdf[n - 1];
        for c in &mut cdf {
            *c /= norm;
        }
        cdf[n - 1] = 1.0;

        Self { q, cdf }
    }

    fn inverse(&self, u: f64) -> f64 {
        let u = u.clamp(0.0, 1.0);
        let i = self
            .cdf
            .partition_point(|&c| c < u)
            .clamp(1, self.cdf.len() - 1);
        let (c0, c1) = (self.cdf[i - 1], self.cdf[i]);
        let (q0, q1) = (self.q[i - 1], self.q[i]);
        if c1 == c0 {
            q0
        } else {
            q0 + (u - c0) * (q1 - q0) / (c1 - c0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    const TRIGGER: f64 = 1_187_008_882.43;

    fn transform() -> PriorTransform {
        PriorTransform::new(PriorBounds::gw170817(TRIGGER)).unwrap()
    }

    fn unit_grid() -> impl Iterator<Item = f64> {
        (0..=1000).map(|i| i as f64 / 1000.0)
    }

    #[test]
    fn chirp_mass_marginal_is_bounded_and_monotone() {
        let t = transform();
        let mut prev = f64::NEG_INFINITY;
        for u in unit_grid() {
            let mc = t.transform(&[u, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5])[0];
            assert!((1.197..=1.198).contains(&mc));
            assert!(mc > prev);
            prev = mc;
        }
    }

    #[test]
    fn inclination_marginal_covers_the_isotropic_range() {
        let t = transform();
        for u in unit_grid() {
            let iota = t.transform(&[0.5, 0.5, 0.5, 0.5, u, 0.5, 0.5])[4];
            assert!((0.0..=PI).contains(&iota));
        }
        assert_relative_eq!(
            t.transform(&[0.5, 0.5, 0.5, 0.5, 0.0, 0.5, 0.5])[4],
            PI,
            max_relative = 1e-12
        );
        assert_eq!(t.transform(&[0.5, 0.5, 0.5, 0.5, 1.0, 0.5, 0.5])[4], 0.0);
    }

    #[test]
    fn distance_cubed_is_affine_in_the_unit_coordinate() {
        let t = transform();
        let mut prev = 0.0;
        for u in unit_grid() {
            let d = t.transform(&[0.5, 0.5, 0.5, 0.5, 0.5, u, 0.5])[5];
            assert!((12.0..=53.0).contains(&d));
            assert!(d >= prev);
            prev = d;
            let expected = 12.0_f64.powi(3) + (53.0_f64.powi(3) - 12.0_f64.powi(3)) * u;
            assert_relative_eq!(d.powi(3), expected, max_relative = 1e-10);
        }
    }

    #[test]
    fn cube_corners_stay_within_bounds() {
        let t = transform();
        let b = *t.bounds();
        for cube in [[0.0; NDIM], [1.0; NDIM]] {
            let out = t.transform(&cube);
            assert!((b.mchirp.0..=b.mchirp.1).contains(&out[0]));
            assert!((b.mass_ratio.0..=b.mass_ratio.1).contains(&out[1]));
            assert!((b.spin1z.0..=b.spin1z.1).contains(&out[2]));
            assert!((b.spin2z.0..=b.spin2z.1).contains(&out[3]));
            assert!((0.0..=PI).contains(&out[4]));
            assert!((b.distance.0..=b.distance.1).contains(&out[5]));
            assert!((b.tc.0..=b.tc.1).contains(&out[6]));
        }
    }

    #[test]
    fn lower_corner_maps_to_lower_bounds() {
        let out = transform().transform(&[0.0; NDIM]);
        assert_relative_eq!(out[0], 1.197, max_relative = 1e-12);
        assert_relative_eq!(out[1], 1.0, max_relative = 1e-9);
        assert_eq!(out[2], 0.0);
        assert_eq!(out[3], 0.0);
        assert_relative_eq!(out[4], PI, max_relative = 1e-12);
        assert_relative_eq!(out[5], 12.0, max_relative = 1e-12);
        assert_relative_eq!(out[6], TRIGGER - 0.15, max_relative = 1e-12);
    }

    #[test]
    fn upper_corner_maps_to_upper_bounds() {
        let out = transform().transform(&[1.0; NDIM]);
        assert_relative_eq!(out[0], 1.198, max_relative = 1e-12);
        assert_relative_eq!(out[1], 1.7, max_relative = 1e-9);
        assert_relative_eq!(out[2], 0.05, max_relative = 1e-12);
        assert_relative_eq!(out[3], 0.05, max_relative = 1e-12);
        assert_eq!(out[4], 0.0);
        assert_relative_eq!(out[5], 53.0, max_relative = 1e-12);
        assert_relative_eq!(out[6], TRIGGER + 0.15, max_relative = 1e-12);
    }

    #[test]
    fn mass_ratio_inverse_cdf_is_monotone() {
        let cdf = MassRatioInvCdf::new(1.0, 1.7);
        let mut prev = 0.0;
        for u in unit_grid() {
            let q = cdf.inverse(u);
            assert!((1.0..=1.7).contains(&q));
            assert!(q >= prev);
            prev = q;
        }
    }

    #[test]
    fn mass_ratio_inverse_cdf_roundtrips_through_the_density() {
        // integrate the density up to inverse(u) and recover u
        let (q_min, q_max) = (1.0, 1.7);
        let cdf = MassRatioInvCdf::new(q_min, q_max);
        let pdf = |q: f64| ((1.0 + q) / q.powi(3)).powf(0.4);
        let integrate = |hi: f64| {
            let n = 20_000;
            let dq = (hi - q_min) / n as f64;
            (0..n)
                .map(|i| {
                    let a = q_min + i as f64 * dq;
                    0.5 * dq * (pdf(a) + pdf(a + dq))
                })
                .sum::<f64>()
        };
        let total = integrate(q_max);
        for u in [0.1, 0.25, 0.5, 0.75, 0.9] {
            let q = cdf.inverse(u);
            assert_relative_eq!(integrate(q) / total, u, max_relative = 1e-5);
        }
    }

    #[test]
    fn mass_ratio_density_prefers_comparable_masses() {
        // p(q) decreases with q, so the median is below the interval middle
        let cdf = MassRatioInvCdf::new(1.0, 1.7);
        assert!(cdf.inverse(0.5) < 1.35);
    }

    #[test]
    fn rejects_degenerate_bounds() {
        let mut b = PriorBounds::gw170817(TRIGGER);
        b.distance = (53.0, 12.0);
        assert!(PriorTransform::new(b).is_err());

        let mut b = PriorBounds::gw170817(TRIGGER);
        b.mass_ratio = (0.5, 1.7);
        assert!(PriorTransform::new(b).is_err());
    }
}
