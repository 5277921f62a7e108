use std::path::PathBuf;

/// Error returned from the parameter-estimation pipeline
#[derive(Debug, thiserror::Error)]
pub enum PeError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed input file {path}: {reason}")]
    MalformedInput { path: PathBuf, reason: String },

    #[error("failed to read npz archive: {0}")]
    ReadNpz(#[from] ndarray_npy::ReadNpzError),

    #[error("failed to write npz archive: {0}")]
    WriteNpz(#[from] ndarray_npy::WriteNpzError),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("sampler stalled: no live-point replacement found after {0} random-walk rounds")]
    SamplerStalled(usize),
}

impl PeError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
