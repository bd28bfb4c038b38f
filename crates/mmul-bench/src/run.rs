//! The benchmark driver: fill, reference, offload, check, report.

use crate::{initial_value, report, BenchError, Config, Rng, Timing};
use mmul_gpu::{AdapterSummary, GemmPipeline, GemmShape, GpuDevice, Kernel, Offload};
use mmul_la::{check_result, CheckReport, Matrix, Reference};
use std::io::Write;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Input operands A and B.
pub struct Inputs {
    pub a: Matrix,
    pub b: Matrix,
}

impl Inputs {
    /// Two n×n matrices filled from a generator seeded with `seed`.
    pub fn generate(n: usize, seed: u64) -> Self {
        let mut rng = Rng::new(seed);
        let a = Matrix::from_fn(n, n, |_, _| initial_value(&mut rng));
        let b = Matrix::from_fn(n, n, |_, _| initial_value(&mut rng));
        Self { a, b }
    }

    pub fn n(&self) -> usize {
        self.a.nrows()
    }
}

/// Result of one benchmark run.
#[derive(Clone, Debug)]
pub struct Summary {
    pub n: usize,
    pub adapter: AdapterSummary,
    pub kernel: Kernel,
    pub reference: Option<Timing>,
    pub gpu: Timing,
    pub check: Option<CheckReport>,
}

/// Compute C = A * B with `reference`; `None` when the reference is disabled.
pub fn run_reference(reference: Reference, inputs: &Inputs) -> Result<Option<(Matrix, Timing)>, BenchError> {
    if !reference.is_enabled() {
        return Ok(None);
    }
    let n = inputs.n();
    let mut c = Matrix::square(n);
    let start = Instant::now();
    reference.run(&inputs.a, &inputs.b, &mut c)?;
    let timing = Timing::new(n, start.elapsed());
    info!(%reference, n, seconds = timing.seconds, "reference GEMM done");
    Ok(Some((c, timing)))
}

/// Compute D = A * B on the device. The fastest of `repeat` timed runs is
/// reported; `warmup` untimed runs come first.
pub fn run_offload(
    device: &GpuDevice,
    kernel: Kernel,
    inputs: &Inputs,
    warmup: u32,
    repeat: u32,
) -> Result<(Vec<f32>, Timing), BenchError> {
    let n = inputs.n();
    let pipeline = GemmPipeline::new(device, kernel);
    let offload = Offload::enter(
        device,
        &pipeline,
        inputs.a.as_slice(),
        inputs.b.as_slice(),
        GemmShape::square(n),
    )?;

    for _ in 0..warmup {
        offload.run();
    }
    let mut best = Duration::MAX;
    for i in 0..repeat.max(1) {
        let elapsed = offload.run();
        debug!(run = i, ?elapsed, "timed GEMM");
        best = best.min(elapsed);
    }

    let d = offload.exit()?;
    let timing = Timing::new(n, best);
    info!(%kernel, n, seconds = timing.seconds, "GPU GEMM done");
    Ok((d, timing))
}

/// Run the whole benchmark described by `config`, writing the report to `out`.
pub fn run(config: &Config, out: &mut impl Write) -> Result<Summary, BenchError> {
    config.validate()?;
    let n = config.size();
    report::matrix_size(out, n)?;

    // Fail on a missing adapter before spending time on the reference.
    let device = GpuDevice::new_sync()?;
    let inputs = Inputs::generate(n, config.seed);

    let reference_routine = match config.reference {
        Reference::Blas => "cblas_sgemm",
        _ => "host loops",
    };
    if config.reference.is_enabled() {
        report::header(out, &format!("Matrix Multiplication on CPU using {reference_routine}"))?;
    }
    let reference = run_reference(config.reference, &inputs)?;
    if let Some((_, timing)) = &reference {
        report::timing(out, timing)?;
    }

    let adapter = device.info().clone();
    report::header(
        out,
        &format!(
            "Matrix Multiplication on GPU using wgpu&{} ({} kernel)",
            adapter.backend, config.kernel
        ),
    )?;
    let (d, gpu) = run_offload(&device, config.kernel, &inputs, config.warmup, config.repeat)?;
    report::timing(out, &gpu)?;

    let check = match &reference {
        Some((c, cpu)) => {
            let check = check_result(c.as_slice(), &d, config.tolerance)?;
            report::check(out, &check)?;
            report::speedup(out, cpu, &gpu)?;
            Some(check)
        }
        None => {
            report::unchecked(out)?;
            None
        }
    };

    if config.strict {
        if let Some(check) = check.as_ref().filter(|c| !c.matched()) {
            return Err(BenchError::Mismatch {
                mismatches: check.mismatches,
                len: check.len,
            });
        }
    }

    Ok(Summary {
        n,
        adapter,
        kernel: config.kernel,
        reference: reference.map(|(_, timing)| timing),
        gpu,
        check,
    })
}
