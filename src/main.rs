use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use gw170817_pe::config::{Cli, IFOS, RunConfig};
use gw170817_pe::error::PeError;
use gw170817_pe::likelihood::{PhaseMarginalizedLikelihood, SourceParams};
use gw170817_pe::nested::{NestedOptions, NestedSampler};
use gw170817_pe::output::{print_summary, samples_file_name, write_samples};
use gw170817_pe::prior::{NDIM, PriorTransform};
use gw170817_pe::strain::DetectorStrain;

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), PeError> {
    let cfg = cli.into_config()?;
    println!(
        "Analysis band: [{:.1}, {:.1}] Hz ({} x fISCO)",
        cfg.f_low, cfg.f_high, cfg.fisco_fraction
    );

    let data = IFOS
        .iter()
        .map(|ifo| {
            let d = DetectorStrain::load(&cfg.data_dir, ifo)?;
            println!(
                "{}: {} frequency bins, {:.0} s segment starting at GPS {:.2}",
                d.ifo,
                d.stilde.len(),
                d.duration(),
                d.epoch
            );
            Ok(d)
        })
        .collect::<Result<Vec<_>, PeError>>()?;

    let model = PhaseMarginalizedLikelihood::new(
        data,
        cfg.sky,
        cfg.trigger_time,
        cfg.f_low,
        cfg.f_high,
    )?;
    let prior = PriorTransform::new(cfg.prior_bounds())?;

    let loglike = |theta: &[f64]| model.loglr(&SourceParams::from_chirp_coords(theta));
    let prior_transform = |cube: &[f64]| {
        let mut fixed = [0.0; NDIM];
        fixed.copy_from_slice(cube);
        prior.transform(&fixed).to_vec()
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(cfg.workers)
        .build()?;

    println!("********** Sampling starts **********");
    let started = Instant::now();

    let mut sampler = NestedSampler::new(
        &loglike,
        &prior_transform,
        NDIM,
        NestedOptions {
            nlive: cfg.nlive,
            walks: cfg.walks,
            dlogz: cfg.dlogz,
            queue_size: cfg.workers,
            seed: cfg.seed,
            max_iter: usize::MAX,
        },
    );
    let result = pool.install(|| sampler.run())?;

    print_summary(&result);

    let path = cfg.output_dir.join(samples_file_name(cfg.fisco_fraction));
    write_samples(&path, &result)?;
    println!("Samples written to {}", path.display());
    write_config_snapshot(&cfg)?;

    println!(
        "Time taken: {:.3} hours.",
        started.elapsed().as_secs_f64() / 3600.0
    );
    Ok(())
}

/// Drop a JSON snapshot of the run settings next to the chain archive.
fn write_config_snapshot(cfg: &RunConfig) -> Result<(), PeError> {
    let path = cfg.output_dir.join("run_config.json");
    let json = serde_json::to_string_pretty(cfg)
        .map_err(|e| PeError::InvalidConfig(format!("cannot serialize settings: {e}")))?;
    std::fs::write(&path, json).map_err(|e| PeError::io(&path, e))
}
