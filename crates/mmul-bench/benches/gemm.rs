use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mmul_bench::flops::gemm_flops;
use mmul_bench::run::Inputs;
use mmul_gpu::{GemmPipeline, GemmShape, GpuDevice, Kernel, Offload};
use mmul_la::{blas, host, Matrix};

const SIZES: &[usize] = &[64, 128, 256, 512];

fn host_gemm(c: &mut Criterion) {
    let mut group = c.benchmark_group("host_gemm");

    for &n in SIZES {
        group.throughput(Throughput::Elements(gemm_flops(n) as u64));
        let inputs = Inputs::generate(n, 0);
        let mut out = Matrix::square(n);

        group.bench_with_input(BenchmarkId::new("naive", n), &n, |b, _| {
            b.iter(|| host::gemm_naive(&inputs.a, &inputs.b, black_box(&mut out)))
        });

        group.bench_with_input(BenchmarkId::new("blocked", n), &n, |b, _| {
            b.iter(|| host::gemm_blocked(&inputs.a, &inputs.b, black_box(&mut out)))
        });

        if blas::AVAILABLE {
            group.bench_with_input(BenchmarkId::new("cblas_sgemm", n), &n, |b, _| {
                b.iter(|| blas::gemm(&inputs.a, &inputs.b, black_box(&mut out), 1.0, 0.0))
            });
        }
    }

    group.finish();
}

fn gpu_gemm(c: &mut Criterion) {
    let Ok(device) = GpuDevice::new_sync() else {
        eprintln!("no GPU adapter; skipping gpu_gemm");
        return;
    };
    let mut group = c.benchmark_group("gpu_gemm");

    for kernel in [Kernel::Naive, Kernel::Tiled] {
        let pipeline = GemmPipeline::new(&device, kernel);
        for &n in SIZES {
            group.throughput(Throughput::Elements(gemm_flops(n) as u64));
            let inputs = Inputs::generate(n, 0);
            let Ok(offload) = Offload::enter(
                &device,
                &pipeline,
                inputs.a.as_slice(),
                inputs.b.as_slice(),
                GemmShape::square(n),
            ) else {
                continue;
            };
            group.bench_with_input(BenchmarkId::new(kernel.name(), n), &n, |b, _| {
                b.iter(|| black_box(offload.run()))
            });
        }
    }

    group.finish();
}

criterion_group!(benches, host_gemm, gpu_gemm);
criterion_main!(benches);
