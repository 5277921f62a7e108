//! Ground-based interferometer geometry: antenna patterns and light-travel
//! delays for the LIGO Hanford/Livingston and Virgo sites.

use std::collections::HashMap;
use std::f64::consts::TAU;

use lazy_static::lazy_static;

use crate::conversions::C_SI;

/// A gravitational-wave interferometer, described by its geocentric vertex
/// location (meters) and its cached detector response tensor.
#[derive(Clone, Debug)]
pub struct Detector {
    pub name: &'static str,
    pub location: [f64; 3],
    pub response: [[f64; 3]; 3],
}

lazy_static! {
    static ref DETECTOR_TABLE: HashMap<&'static str, Detector> = {
        let mut table = HashMap::new();
        table.insert(
            "H1",
            Detector {
                name: "H1",
                location: [-2.161_414_928_68e6, -3.834_695_183_93e6, 4.600_350_224_06e6],
                response: [
                    [-0.392_614_1, -0.077_612_99, -0.247_388_54],
                    [-0.077_612_99, 0.319_524_41, 0.227_998_1],
                    [-0.247_388_54, 0.227_998_1, 0.073_089_68],
                ],
            },
        );
        table.insert(
            "L1",
            Detector {
                name: "L1",
                location: [-7.427_604_192e4, -5.496_283_721_61e6, 3.224_257_016_12e6],
                response: [
                    [0.411_280_87, 0.140_209_7, 0.247_294_36],
                    [0.140_209_7, -0.109_005_63, -0.181_615_63],
                    [0.247_294_36, -0.181_615_63, -0.302_275_24],
                ],
            },
        );
        table.insert(
            "V1",
            Detector {
                name: "V1",
                location: [4.546_374_099e6, 8.429_897_e5, 4.378_576_962e6],
                response: [
                    [0.243_874_04, -0.099_083_78, -0.232_576_22],
                    [-0.099_083_78, -0.447_825_85, 0.187_833_1],
                    [-0.232_576_22, 0.187_833_1, 0.203_951_81],
                ],
            },
        );
        table
    };
}

impl Detector {
    /// Look up a detector by its two-character prefix (`H1`, `L1`, `V1`).
    pub fn by_name(name: &str) -> Option<&'static Detector> {
        DETECTOR_TABLE.get(name)
    }

    /// Plus and cross antenna-pattern factors for a source at (ra, dec) with
    /// polarization angle psi, observed at the given GPS time.
    pub fn antenna_pattern(&self, ra: f64, dec: f64, psi: f64, gps: f64) -> (f64, f64) {
        let gha = greenwich_mean_sidereal_time(gps) - ra;
        let (singha, cosgha) = gha.sin_cos();
        let (sindec, cosdec) = dec.sin_cos();
        let (sinpsi, cospsi) = psi.sin_cos();

        let x = [
            -cospsi * singha - sinpsi * cosgha * sindec,
            -cospsi * cosgha + sinpsi * singha * sindec,
            sinpsi * cosdec,
        ];
        let y = [
            sinpsi * singha - cospsi * cosgha * sindec,
            sinpsi * cosgha + cospsi * singha * sindec,
            cospsi * cosdec,
        ];

        let mut fplus = 0.0;
        let mut fcross = 0.0;
        for i in 0..3 {
            for j in 0..3 {
                let d = self.response[i][j];
                fplus += d * (x[i] * x[j] - y[i] * y[j]);
                fcross += d * (x[i] * y[j] + y[i] * x[j]);
            }
        }
        (fplus, fcross)
    }

    /// Arrival-time offset of a plane wave at this detector relative to the
    /// geocenter, seconds. Positive when the wavefront reaches the geocenter
    /// first.
    pub fn time_delay_from_earth_center(&self, ra: f64, dec: f64, gps: f64) -> f64 {
        let gha = greenwich_mean_sidereal_time(gps) - ra;
        let (sindec, cosdec) = dec.sin_cos();
        // unit vector pointing from the geocenter towards the source, in the
        // rotating Earth-fixed frame
        let n = [cosdec * gha.cos(), -cosdec * gha.sin(), sindec];
        -(self.location[0] * n[0] + self.location[1] * n[1] + self.location[2] * n[2]) / C_SI
    }
}

/// Greenwich mean sidereal time (radians, unwrapped) for a GPS timestamp.
///
/// Earth rotation angle from the IAU 2000 model plus the IAU 2006 precession
/// polynomial, with UT1 approximated by UTC. The leap-second count is fixed
/// to the 2017 value, which covers the O2 observing run this analysis
/// targets.
pub fn greenwich_mean_sidereal_time(gps: f64) -> f64 {
    const GPS_EPOCH_UNIX: f64 = 315_964_800.0;
    const GPS_MINUS_UTC: f64 = 18.0;
    const ARCSEC: f64 = TAU / (360.0 * 3600.0);

    let unix = gps + GPS_EPOCH_UNIX - GPS_MINUS_UTC;
    // days since the J2000 epoch (JD 2451545.0 = unix 946728000)
    let d = (unix - 946_728_000.0) / 86_400.0;
    let era = TAU * (0.779_057_273_264 + 1.002_737_811_911_354_48 * d);

    let t = d / 36_525.0;
    let precession =
        ARCSEC * (0.014_506 + t * (4_612.156_534 + t * (1.391_581_7 - t * 0.000_000_44)));
    era + precession
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const GW170817_GPS: f64 = 1_187_008_882.43;
    const RA: f64 = 3.44616;
    const DEC: f64 = -0.408084;

    #[test]
    fn all_detectors_present() {
        for ifo in ["H1", "L1", "V1"] {
            assert!(Detector::by_name(ifo).is_some());
        }
        assert!(Detector::by_name("K1").is_none());
    }

    #[test]
    fn sidereal_day_advances_one_turn() {
        const SIDEREAL_DAY: f64 = 86_164.090_5;
        let a = greenwich_mean_sidereal_time(GW170817_GPS);
        let b = greenwich_mean_sidereal_time(GW170817_GPS + SIDEREAL_DAY);
        assert_relative_eq!(b - a, TAU, max_relative = 1e-6);
    }

    #[test]
    fn antenna_pattern_is_bounded() {
        for ifo in ["H1", "L1", "V1"] {
            let det = Detector::by_name(ifo).unwrap();
            for k in 0..32 {
                let psi = TAU * k as f64 / 32.0;
                let (fp, fc) = det.antenna_pattern(RA, DEC, psi, GW170817_GPS);
                assert!(fp.abs() <= 1.0 + 1e-9);
                assert!(fc.abs() <= 1.0 + 1e-9);
                assert!(fp * fp + fc * fc <= 1.0 + 1e-9);
            }
        }
    }

    #[test]
    fn polarization_rotates_pattern_by_two_psi() {
        let det = Detector::by_name("L1").unwrap();
        let (fp, fc) = det.antenna_pattern(RA, DEC, 0.3, GW170817_GPS);
        let (fp_rot, fc_rot) =
            det.antenna_pattern(RA, DEC, 0.3 + std::f64::consts::FRAC_PI_2, GW170817_GPS);
        assert_relative_eq!(fp_rot, -fp, max_relative = 1e-9);
        assert_relative_eq!(fc_rot, -fc, max_relative = 1e-9);
    }

    #[test]
    fn delays_are_within_the_light_travel_bound() {
        // Earth radius over c
        let bound = 6.4e6 / C_SI;
        for ifo in ["H1", "L1", "V1"] {
            let det = Detector::by_name(ifo).unwrap();
            let dt = det.time_delay_from_earth_center(RA, DEC, GW170817_GPS);
            assert!(dt.abs() < bound, "{ifo} delay {dt} outside light bound");
        }
    }

    #[test]
    fn hanford_livingston_separation_delay() {
        // H1 and L1 are ~3000 km apart, so their relative delay can never
        // exceed ~10 ms for any sky position
        let h1 = Detector::by_name("H1").unwrap();
        let l1 = Detector::by_name("L1").unwrap();
        for k in 0..16 {
            let ra = TAU * k as f64 / 16.0;
            let dh = h1.time_delay_from_earth_center(ra, DEC, GW170817_GPS);
            let dl = l1.time_delay_from_earth_center(ra, DEC, GW170817_GPS);
            assert!((dh - dl).abs() < 0.011);
        }
    }
}
