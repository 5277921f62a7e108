//! Small special-function helpers used by the marginalized likelihood and
//! the evidence accumulation.

/// Natural logarithm of the modified Bessel function of the first kind I0.
///
/// Uses the Abramowitz & Stegun 9.8.1 polynomial for |x| < 3.75 and the
/// 9.8.2 scaled expansion above, which keeps the result finite for the large
/// arguments produced by loud signals where I0 itself overflows.
pub fn ln_i0(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 3.75 {
        let t = (ax / 3.75).powi(2);
        let i0 = 1.0
            + t * (3.515_622_9
                + t * (3.089_942_4
                    + t * (1.206_749_2
                        + t * (0.265_973_2 + t * (0.036_076_8 + t * 0.004_581_3)))));
        i0.ln()
    } else {
        let t = 3.75 / ax;
        let poly = 0.398_942_28
            + t * (0.013_285_92
                + t * (0.002_253_19
                    + t * (-0.001_575_65
                        + t * (0.009_162_81
                            + t * (-0.020_577_06
                                + t * (0.026_355_37
                                    + t * (-0.016_476_33 + t * 0.003_923_77)))))));
        ax - 0.5 * ax.ln() + poly.ln()
    }
}

/// ln(exp(a) + exp(b)) without overflow.
pub fn logaddexp(a: f64, b: f64) -> f64 {
    if a == f64::NEG_INFINITY {
        return b;
    }
    if b == f64::NEG_INFINITY {
        return a;
    }
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    hi + (lo - hi).exp().ln_1p()
}

/// ln(exp(a) - exp(b)) for a > b.
pub fn logsubexp(a: f64, b: f64) -> f64 {
    debug_assert!(a >= b);
    if b == f64::NEG_INFINITY {
        return a;
    }
    a + (-((b - a).exp_m1())).ln()
}
