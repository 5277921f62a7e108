//! Bayesian parameter estimation for the GW170817 binary neutron star
//! merger.
//!
//! The crate wires four pieces together: conditioned detector data in
//! frequency domain ([`strain`]), a phase-marginalized Gaussian-noise
//! likelihood under the TaylorF2 waveform ([`likelihood`], [`waveform`],
//! [`detector`]), the inverse-CDF prior transform over the seven sampled
//! parameters ([`prior`]), and a static nested sampler with parallel
//! random-walk replacement ([`nested`]). The `gw170817-pe` binary runs the
//! whole pipeline and writes the weighted chain to an `.npz` archive.

pub mod config;
pub mod conversions;
pub mod detector;
pub mod error;
pub mod likelihood;
pub mod nested;
pub mod output;
pub mod prior;
pub mod special;
pub mod strain;
pub mod waveform;

pub use error::PeError;
pub use likelihood::{PhaseMarginalizedLikelihood, SkyLocation, SourceParams};
pub use nested::{NestedOptions, NestedResult, NestedSampler};
pub use prior::{NDIM, PARAM_NAMES, PriorBounds, PriorTransform};
pub use strain::DetectorStrain;
