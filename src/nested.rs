//! Static nested sampling with random-walk live-point replacement.
//!
//! The sampler owns a fixed set of live points drawn in the unit hypercube.
//! Each iteration retires the lowest-likelihood point, credits it with the
//! trapezoid shell weight of the prior volume it vacates, and replaces it by
//! random-walking a copy of a surviving point under the hard constraint
//! `logl > logl_star`. Replacement walks are generated in batches on the
//! rayon thread pool; independent evaluations need no ordering, so batches
//! may be consumed out of order.

use std::collections::VecDeque;

use rand::prelude::*;
use rayon::prelude::*;

use crate::error::PeError;
use crate::special::{logaddexp, logsubexp};

/// A member of the live set: its unit-cube coordinates, the physical point
/// they map to, and the log-likelihood there.
#[derive(Clone, Debug)]
pub struct LivePoint {
    pub unit: Vec<f64>,
    pub theta: Vec<f64>,
    pub logl: f64,
}

/// Tuning knobs of the run.
#[derive(Clone, Copy, Debug)]
pub struct NestedOptions {
    /// Number of live points.
    pub nlive: usize,
    /// Steps per replacement random walk.
    pub walks: usize,
    /// Stop when the estimated remaining evidence drops below this.
    pub dlogz: f64,
    /// Replacement candidates generated per parallel batch; matches the
    /// worker count.
    pub queue_size: usize,
    pub seed: u64,
    /// Hard iteration cap, a safety net against pathological likelihoods.
    pub max_iter: usize,
}

impl Default for NestedOptions {
    fn default() -> Self {
        Self {
            nlive: 1000,
            walks: 40,
            dlogz: 1e-4,
            queue_size: 1,
            seed: 42,
            max_iter: usize::MAX,
        }
    }
}

/// The dead-point chain and evidence accumulators of a finished run.
#[derive(Clone, Debug)]
pub struct NestedResult {
    /// Physical parameters of each retired point, iteration order.
    pub samples: Vec<Vec<f64>>,
    /// ln of the posterior weight of each sample (unnormalized).
    pub logwt: Vec<f64>,
    /// Log-likelihood of each sample.
    pub logl: Vec<f64>,
    /// Running ln-evidence after each sample.
    pub logz: Vec<f64>,
    /// Final ln-evidence uncertainty, sqrt(H / nlive).
    pub logzerr: f64,
    /// Total likelihood evaluations.
    pub ncall: u64,
    /// Iterations before the live set was folded in.
    pub niter: usize,
}

impl NestedResult {
    pub fn ln_evidence(&self) -> f64 {
        self.logz.last().copied().unwrap_or(f64::NEG_INFINITY)
    }

    /// Posterior weights normalized to the final evidence.
    pub fn normalized_weights(&self) -> Vec<f64> {
        let logz = self.ln_evidence();
        self.logwt.iter().map(|&w| (w - logz).exp()).collect()
    }

    /// Weighted posterior mean and standard deviation per dimension.
    pub fn posterior_moments(&self) -> Vec<(f64, f64)> {
        let ndim = self.samples.first().map_or(0, Vec::len);
        let weights = self.normalized_weights();
        (0..ndim)
            .map(|dim| {
                let mean: f64 = self
                    .samples
                    .iter()
                    .zip(&weights)
                    .map(|(s, &w)| w * s[dim])
                    .sum();
                let var: f64 = self
                    .samples
                    .iter()
                    .zip(&weights)
                    .map(|(s, &w)| w * (s[dim] - mean).powi(2))
                    .sum();
                (mean, var.sqrt())
            })
            .collect()
    }
}

/// Static nested sampler over a unit-cube prior transform and a
/// log-likelihood, both shared immutably across worker threads.
pub struct NestedSampler<'a, L, P>
where
    L: Fn(&[f64]) -> f64 + Sync,
    P: Fn(&[f64]) -> Vec<f64> + Sync,
{
    loglike: &'a L,
    prior_transform: &'a P,
    ndim: usize,
    opts: NestedOptions,
    rng: StdRng,
    live: Vec<LivePoint>,
    queue: VecDeque<LivePoint>,
    scale: f64,
    ncall: u64,
}

impl<'a, L, P> NestedSampler<'a, L, P>
where
    L: Fn(&[f64]) -> f64 + Sync,
    P: Fn(&[f64]) -> Vec<f64> + Sync,
{
    pub fn new(loglike: &'a L, prior_transform: &'a P, ndim: usize, opts: NestedOptions) -> Self {
        Self {
            loglike,
            prior_transform,
            ndim,
            opts,
            rng: StdRng::seed_from_u64(opts.seed),
            live: Vec::new(),
            queue: VecDeque::new(),
            scale: 0.5,
            ncall: 0,
        }
    }

    fn draw_initial(&mut self) {
        let ndim = self.ndim;
        let units: Vec<Vec<f64>> = (0..self.opts.nlive)
            .map(|_| (0..ndim).map(|_| self.rng.random::<f64>()).collect())
            .collect();
        let loglike = self.loglike;
        let prior_transform = self.prior_transform;
        self.live = units
            .into_par_iter()
            .map(|unit| {
                let theta = prior_transform(&unit);
                let logl = loglike(&theta);
                LivePoint { unit, theta, logl }
            })
            .collect();
        self.ncall += self.opts.nlive as u64;
    }

    /// Run to the dlogz stopping criterion and fold in the remaining live
    /// points.
    pub fn run(&mut self) -> Result<NestedResult, PeError> {
        let nlive = self.opts.nlive;
        self.draw_initial();

        let mut samples = Vec::new();
        let mut logwt_chain = Vec::new();
        let mut logl_chain = Vec::new();
        let mut logz_chain = Vec::new();

        // prior-volume ladder: each iteration shrinks ln X by 1/nlive
        let shrink = 1.0 / nlive as f64;
        let mut logvol = 0.0;
        let mut logz = f64::NEG_INFINITY;
        let mut h = 0.0;

        let mut iter = 0;
        while iter < self.opts.max_iter {
            let worst = self.worst_index();
            let logl_star = self.live[worst].logl;
            let logl_max = self
                .live
                .iter()
                .map(|p| p.logl)
                .fold(f64::NEG_INFINITY, f64::max);

            // stop when even the best live point cannot move the evidence
            let dlogz_est = logaddexp(logz, logl_max + logvol) - logz;
            if dlogz_est < self.opts.dlogz {
                break;
            }

            let logvol_next = logvol - shrink;
            let logdvol = logsubexp(logvol, logvol_next);
            let logwt = logl_star + logdvol;

            let logz_new = logaddexp(logz, logwt);
            let carried = if logz.is_finite() {
                (logz - logz_new).exp() * (h + logz)
            } else {
                0.0
            };
            h = (logwt - logz_new).exp() * logl_star + carried - logz_new;
            logz = logz_new;
            logvol = logvol_next;

            let replacement = self.next_replacement(logl_star)?;
            let dead = std::mem::replace(&mut self.live[worst], replacement);

            samples.push(dead.theta);
            logwt_chain.push(logwt);
            logl_chain.push(dead.logl);
            logz_chain.push(logz);
            iter += 1;
        }

        // fold in the survivors: the remaining volume is split evenly
        let niter = iter;
        let logdvol = logvol - (nlive as f64).ln();
        self.live
            .sort_by(|a, b| a.logl.partial_cmp(&b.logl).expect("NaN log-likelihood"));
        for point in std::mem::take(&mut self.live) {
            let logwt = point.logl + logdvol;
            let logz_new = logaddexp(logz, logwt);
            let carried = if logz.is_finite() {
                (logz - logz_new).exp() * (h + logz)
            } else {
                0.0
            };
            h = (logwt - logz_new).exp() * point.logl + carried - logz_new;
            logz = logz_new;

            samples.push(point.theta);
            logwt_chain.push(logwt);
            logl_chain.push(point.logl);
            logz_chain.push(logz);
        }

        Ok(NestedResult {
            samples,
            logwt: logwt_chain,
            logl: logl_chain,
            logz: logz_chain,
            logzerr: (h.max(0.0) / nlive as f64).sqrt(),
            ncall: self.ncall,
            niter,
        })
    }

    fn worst_index(&self) -> usize {
        let mut worst = 0;
        for (i, p) in self.live.iter().enumerate() {
            if p.logl < self.live[worst].logl {
                worst = i;
            }
        }
        worst
    }

    /// Pop a queued candidate that still satisfies the current constraint,
    /// refilling the queue as needed. Constraints only tighten, so a stale
    /// candidate is discarded rather than resurrected.
    fn next_replacement(&mut self, logl_star: f64) -> Result<LivePoint, PeError> {
        const MAX_EMPTY_ROUNDS: usize = 1000;
        let mut empty_rounds = 0;
        loop {
            if let Some(candidate) = self.queue.pop_front() {
                if candidate.logl >= logl_star {
                    return Ok(candidate);
                }
                continue;
            }
            let produced = self.fill_queue(logl_star);
            if produced == 0 {
                empty_rounds += 1;
                if empty_rounds >= MAX_EMPTY_ROUNDS {
                    return Err(PeError::SamplerStalled(empty_rounds));
                }
            } else {
                empty_rounds = 0;
            }
        }
    }

    /// Launch one parallel batch of random walks and push the survivors.
    /// Returns the number of candidates produced.
    fn fill_queue(&mut self, logl_star: f64) -> usize {
        let batch: Vec<(u64, usize)> = (0..self.opts.queue_size.max(1))
            .map(|_| {
                (
                    self.rng.random::<u64>(),
                    self.rng.random_range(0..self.live.len()),
                )
            })
            .collect();

        let walks = self.opts.walks;
        let scale = self.scale;
        let ndim = self.ndim;
        let loglike = self.loglike;
        let prior_transform = self.prior_transform;
        let live = &self.live;

        let outcomes: Vec<WalkOutcome> = batch
            .par_iter()
            .map(|&(seed, start)| {
                random_walk(
                    &live[start],
                    seed,
                    logl_star,
                    walks,
                    scale,
                    ndim,
                    loglike,
                    prior_transform,
                )
            })
            .collect();

        let mut produced = 0;
        let mut naccept = 0;
        let mut ncall = 0u64;
        for out in outcomes {
            naccept += out.naccept;
            ncall += out.ncall;
            if let Some(point) = out.point {
                self.queue.push_back(point);
                produced += 1;
            }
        }
        self.ncall += ncall;

        // steer the proposal scale towards ~50% acceptance
        let facc = naccept as f64 / ncall.max(1) as f64;
        self.scale = (self.scale * ((facc - 0.5) / ndim as f64).exp()).clamp(1e-5, 1.0);

        produced
    }
}

struct WalkOutcome {
    point: Option<LivePoint>,
    naccept: usize,
    ncall: u64,
}

/// Evolve a copy of `start` with a bounded random walk in the unit cube,
/// accepting only moves above the likelihood constraint.
#[allow(clippy::too_many_arguments)]
fn random_walk<L, P>(
    start: &LivePoint,
    seed: u64,
    logl_star: f64,
    walks: usize,
    scale: f64,
    ndim: usize,
    loglike: &L,
    prior_transform: &P,
) -> WalkOutcome
where
    L: Fn(&[f64]) -> f64 + Sync,
    P: Fn(&[f64]) -> Vec<f64> + Sync,
{
    let mut rng = StdRng::seed_from_u64(seed);
    let mut unit = start.unit.clone();
    let mut accepted: Option<LivePoint> = None;
    let mut naccept = 0;

    for _ in 0..walks {
        let proposal: Vec<f64> = (0..ndim)
            .map(|i| reflect_unit(unit[i] + scale * (2.0 * rng.random::<f64>() - 1.0)))
            .collect();
        let theta = prior_transform(&proposal);
        let logl = loglike(&theta);
        if logl >= logl_star {
            unit = proposal.clone();
            accepted = Some(LivePoint {
                unit: proposal,
                theta,
                logl,
            });
            naccept += 1;
        }
    }

    WalkOutcome {
        point: accepted,
        naccept,
        ncall: walks as u64,
    }
}

/// Reflect a coordinate back into [0, 1].
fn reflect_unit(x: f64) -> f64 {
    let x = x.rem_euclid(2.0);
    if x > 1.0 { 2.0 - x } else { x }
}
