use mmul_gpu::GpuError;
use mmul_la::LaError;

/// Error type for a benchmark run.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    #[error(transparent)]
    La(#[from] LaError),
    #[error(transparent)]
    Gpu(#[from] GpuError),
    #[error("invalid configuration: {0}")]
    Config(String),
    /// `--strict` was given and the GPU result disagrees with the reference.
    #[error("{mismatches} of {len} elements differ from the reference")]
    Mismatch { mismatches: usize, len: usize },
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}
