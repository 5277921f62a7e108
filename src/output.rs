//! Persistence of the sampling chain and the console summary.

use std::fs::File;
use std::path::{Path, PathBuf};

use ndarray::Array1;
use ndarray_npy::NpzWriter;

use crate::error::PeError;
use crate::nested::NestedResult;
use crate::prior::{NDIM, PARAM_NAMES};

/// File name of the chain archive for a given fISCO fraction, mirroring the
/// `{fraction}_fISCO` naming of the cutoff study this analysis belongs to.
pub fn samples_file_name(fisco_fraction: f64) -> String {
    format!("samples_data_{fisco_fraction}_fISCO.npz")
}

/// Write one named array per sampled parameter plus the chain diagnostics
/// (`logwt`, `logz`, `logl`), all aligned by sample index.
pub fn write_samples(path: &Path, result: &NestedResult) -> Result<PathBuf, PeError> {
    let n = result.samples.len();
    let mut npz = NpzWriter::new(File::create(path).map_err(|e| PeError::io(path, e))?);

    for (dim, name) in PARAM_NAMES.iter().enumerate() {
        let column: Array1<f64> = result.samples.iter().map(|s| s[dim]).collect();
        npz.add_array(*name, &column)?;
    }
    npz.add_array("logwt", &Array1::from_vec(result.logwt.clone()))?;
    npz.add_array("logz", &Array1::from_vec(result.logz.clone()))?;
    npz.add_array("logl", &Array1::from_vec(result.logl.clone()))?;
    npz.finish()?;

    debug_assert_eq!(result.logwt.len(), n);
    Ok(path.to_owned())
}

/// Print the evidence and a weighted one-sigma summary of each parameter.
pub fn print_summary(result: &NestedResult) {
    println!(
        "Evidence: ln Z = {:.4} +/- {:.4}",
        result.ln_evidence(),
        result.logzerr
    );
    println!(
        "{} samples, {} iterations, {} likelihood calls",
        result.samples.len(),
        result.niter,
        result.ncall
    );
    println!("Posterior (weighted mean +/- std):");
    let moments = result.posterior_moments();
    for dim in 0..NDIM.min(moments.len()) {
        let (mean, std) = moments[dim];
        println!("    {:<10} {:.6} +/- {:.6}", PARAM_NAMES[dim], mean, std);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray_npy::NpzReader;

    fn toy_result() -> NestedResult {
        let samples = vec![
            vec![1.1971, 1.1, 0.01, 0.02, 2.9, 30.0, 0.05],
            vec![1.1975, 1.2, 0.02, 0.03, 3.0, 35.0, 0.06],
            vec![1.1979, 1.3, 0.03, 0.04, 3.1, 40.0, 0.07],
        ];
        NestedResult {
            samples,
            logwt: vec![-3.0, -2.0, -1.0],
            logl: vec![10.0, 11.0, 12.0],
            logz: vec![-3.0, -1.7, -0.8],
            logzerr: 0.1,
            ncall: 123,
            niter: 2,
        }
    }

    #[test]
    fn file_name_embeds_the_fraction() {
        assert_eq!(samples_file_name(0.6), "samples_data_0.6_fISCO.npz");
        assert_eq!(samples_file_name(1.0), "samples_data_1_fISCO.npz");
    }

    #[test]
    fn chain_roundtrips_through_the_archive() {
        let dir = std::env::temp_dir().join(format!("gw170817-pe-out-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(samples_file_name(0.6));

        write_samples(&path, &toy_result()).unwrap();

        let mut npz = NpzReader::new(File::open(&path).unwrap()).unwrap();
        let read = |npz: &mut NpzReader<File>, name: &str| -> Array1<f64> {
            npz.by_name(name)
                .or_else(|_| npz.by_name(&format!("{name}.npy")))
                .unwrap()
        };
        let mchirp = read(&mut npz, "mchirp");
        assert_eq!(mchirp.len(), 3);
        assert_relative_eq!(mchirp[1], 1.1975, max_relative = 1e-12);
        let tc = read(&mut npz, "tc");
        assert_relative_eq!(tc[2], 0.07, max_relative = 1e-12);
        let logz = read(&mut npz, "logz");
        assert_relative_eq!(logz[2], -0.8, max_relative = 1e-12);
        let logwt = read(&mut npz, "logwt");
        assert_eq!(logwt.len(), 3);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
