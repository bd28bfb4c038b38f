//! Command-line configuration.

use crate::{BenchError, DEFAULT_SEED};
use clap::Parser;
use mmul_gpu::Kernel;
use mmul_la::Reference;

/// Largest accepted size exponent (16384 x 16384, 1 GiB per matrix).
pub const MAX_EXPONENT: u32 = 14;

/// Default size exponent (1024 x 1024).
pub const DEFAULT_EXPONENT: u32 = 10;

/// Compare SGEMM throughput between a CPU BLAS and a GPU kernel.
#[derive(Clone, Debug, Parser)]
#[command(name = "mmul", version, about)]
pub struct Config {
    /// Matrix size as a power of two: N = 2^EXPONENT.
    #[arg(default_value_t = DEFAULT_EXPONENT)]
    pub exponent: u32,

    /// GPU kernel: naive (one invocation per element) or tiled.
    #[arg(long, default_value_t = Kernel::Naive)]
    pub kernel: Kernel,

    /// Reference routine: blas, host, or none to skip validation.
    #[arg(long, default_value_t = Reference::available())]
    pub reference: Reference,

    /// Seed for input generation.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Relative tolerance when comparing against the reference.
    #[arg(long, default_value_t = 1e-3)]
    pub tolerance: f32,

    /// Untimed kernel runs before measuring.
    #[arg(long, default_value_t = 0)]
    pub warmup: u32,

    /// Timed kernel runs; the fastest is reported.
    #[arg(long, default_value_t = 1)]
    pub repeat: u32,

    /// Exit with an error when the GPU result does not match the reference.
    #[arg(long)]
    pub strict: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exponent: DEFAULT_EXPONENT,
            kernel: Kernel::default(),
            reference: Reference::available(),
            seed: DEFAULT_SEED,
            tolerance: 1e-3,
            warmup: 0,
            repeat: 1,
            strict: false,
            verbose: 0,
        }
    }
}

impl Config {
    /// Matrix edge length N.
    pub fn size(&self) -> usize {
        1usize << self.exponent
    }

    pub fn validate(&self) -> Result<(), BenchError> {
        if self.exponent > MAX_EXPONENT {
            return Err(BenchError::Config(format!(
                "size exponent {} is out of range 0..={MAX_EXPONENT}",
                self.exponent
            )));
        }
        if self.repeat == 0 {
            return Err(BenchError::Config("--repeat must be at least 1".into()));
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(BenchError::Config(format!(
                "tolerance must be a non-negative number, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }

    /// Default `tracing` filter directive for the verbosity level.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
