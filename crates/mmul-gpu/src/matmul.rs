//! The GEMM offload region.

use crate::buffer::{GpuBuffer, Operand};
use crate::device::GpuDevice;
use crate::kernel::{GemmPipeline, GemmShape};
use crate::GpuError;
use std::time::{Duration, Instant};

/// Device-resident operands for one GEMM.
///
/// A and B are uploaded and C allocated on [`enter`](Self::enter); every
/// [`run`](Self::run) recomputes C in place; [`exit`](Self::exit) copies C
/// back and releases the device buffers.
pub struct Offload<'a> {
    device: &'a GpuDevice,
    pipeline: &'a GemmPipeline,
    shape: GemmShape,
    out: GpuBuffer,
    bind_group: wgpu::BindGroup,
    // Bound through `bind_group`; held so the buffers outlive every run.
    _inputs: [GpuBuffer; 2],
    _dims: wgpu::Buffer,
}

impl<'a> Offload<'a> {
    /// Upload A and B, allocate C.
    pub fn enter(
        device: &'a GpuDevice,
        pipeline: &'a GemmPipeline,
        a: &[f32],
        b: &[f32],
        shape: GemmShape,
    ) -> Result<Self, GpuError> {
        if shape.is_empty() {
            return Err(GpuError::Dimension(format!("empty shape {shape:?}")));
        }
        if a.len() != shape.a_len() || b.len() != shape.b_len() {
            return Err(GpuError::Dimension(format!(
                "A has {} elements, B has {}, shape {shape:?} needs {} and {}",
                a.len(),
                b.len(),
                shape.a_len(),
                shape.b_len(),
            )));
        }

        let buf_a = GpuBuffer::upload(device, Operand::A, a)?;
        let buf_b = GpuBuffer::upload(device, Operand::B, b)?;
        let out = GpuBuffer::allocate(device, Operand::C, shape.c_len())?;

        use wgpu::util::DeviceExt;
        let dims = device
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mmul-gpu gemm dims"),
                contents: bytemuck::cast_slice(&shape.uniform()),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let bind_group = pipeline.bind(device, [&buf_a.buffer, &buf_b.buffer, &out.buffer, &dims]);

        // Settle the uploads outside the timed region.
        device.wait();
        tracing::debug!(?shape, kernel = %pipeline.kernel(), "entered offload region");

        Ok(Self {
            device,
            pipeline,
            shape,
            out,
            bind_group,
            _inputs: [buf_a, buf_b],
            _dims: dims,
        })
    }

    pub fn shape(&self) -> GemmShape {
        self.shape
    }

    /// Dispatch the kernel and block until it completes; returns wall time.
    pub fn run(&self) -> Duration {
        let start = Instant::now();

        let mut encoder = self
            .device
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("mmul-gpu gemm dispatch"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("mmul-gpu gemm compute"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            let (wg_x, wg_y) = self.pipeline.kernel().workgroups(self.shape);
            pass.dispatch_workgroups(wg_x, wg_y, 1);
        }
        let index = self.device.queue.submit(std::iter::once(encoder.finish()));
        self.device
            .device
            .poll(wgpu::Maintain::WaitForSubmissionIndex(index));

        let elapsed = start.elapsed();
        tracing::debug!(?elapsed, "GEMM dispatch complete");
        elapsed
    }

    /// Copy C back to the host and release the device buffers.
    pub fn exit(self) -> Result<Vec<f32>, GpuError> {
        self.out.read_back(self.device)
    }
}

/// C = A @ B on the device: enter, run once, exit.
pub fn gemm(
    device: &GpuDevice,
    pipeline: &GemmPipeline,
    a: &[f32],
    b: &[f32],
    shape: GemmShape,
) -> Result<Vec<f32>, GpuError> {
    let offload = Offload::enter(device, pipeline, a, b, shape)?;
    offload.run();
    offload.exit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Kernel;

    fn host_gemm(a: &[f32], b: &[f32], shape: GemmShape) -> Vec<f32> {
        let GemmShape { m, k, n } = shape;
        let mut c = vec![0.0f32; m * n];
        for i in 0..m {
            for j in 0..n {
                c[i * n + j] = (0..k).map(|p| a[i * k + p] * b[p * n + j]).sum();
            }
        }
        c
    }

    #[test]
    fn rectangular_both_kernels() {
        let Some(device) = GpuDevice::for_tests() else {
            return;
        };
        // A: 2x3, B: 3x2 -> C: 2x2
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = [7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let shape = GemmShape { m: 2, k: 3, n: 2 };
        for kernel in [Kernel::Naive, Kernel::Tiled] {
            let pipeline = GemmPipeline::new(&device, kernel);
            let c = gemm(&device, &pipeline, &a, &b, shape).unwrap();
            assert_eq!(c, vec![58.0, 64.0, 139.0, 154.0], "{kernel}");
        }
    }

    #[test]
    fn matches_host_on_non_tile_multiple() {
        let Some(device) = GpuDevice::for_tests() else {
            return;
        };
        let n = 37;
        let shape = GemmShape::square(n);
        let a: Vec<f32> = (0..n * n).map(|i| ((i * 7) % 256) as f32 / 10.0).collect();
        let b: Vec<f32> = (0..n * n).map(|i| ((i * 13) % 256) as f32 / 10.0).collect();
        let expected = host_gemm(&a, &b, shape);
        for kernel in [Kernel::Naive, Kernel::Tiled] {
            let pipeline = GemmPipeline::new(&device, kernel);
            let c = gemm(&device, &pipeline, &a, &b, shape).unwrap();
            for (x, y) in expected.iter().zip(&c) {
                assert!((x - y).abs() <= 1e-3 * x.abs().max(1.0), "{kernel}: {x} vs {y}");
            }
        }
    }

    #[test]
    fn repeated_runs_are_deterministic() {
        let Some(device) = GpuDevice::for_tests() else {
            return;
        };
        let shape = GemmShape::square(16);
        let a: Vec<f32> = (0..256).map(|i| (i % 17) as f32).collect();
        let pipeline = GemmPipeline::new(&device, Kernel::Naive);
        let offload = Offload::enter(&device, &pipeline, &a, &a, shape).unwrap();
        assert!(offload.run() > Duration::ZERO);
        assert!(offload.run() > Duration::ZERO);
        let first = offload.exit().unwrap();
        let second = gemm(&device, &pipeline, &a, &a, shape).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_bad_operands() {
        let Some(device) = GpuDevice::for_tests() else {
            return;
        };
        let pipeline = GemmPipeline::new(&device, Kernel::Naive);
        let err = Offload::enter(&device, &pipeline, &[1.0; 3], &[1.0; 4], GemmShape::square(2));
        assert!(matches!(err, Err(GpuError::Dimension(_))));
        let err = Offload::enter(&device, &pipeline, &[], &[], GemmShape::square(0));
        assert!(matches!(err, Err(GpuError::Dimension(_))));
    }

    #[test]
    fn oversized_output_names_operand_c() {
        let Some(device) = GpuDevice::for_tests() else {
            return;
        };
        // A and B are tiny; C alone is past any u32 binding limit.
        let n = 40_000;
        let shape = GemmShape { m: n, k: 1, n };
        let a = vec![1.0f32; n];
        let pipeline = GemmPipeline::new(&device, Kernel::Naive);
        match Offload::enter(&device, &pipeline, &a, &a, shape) {
            Err(GpuError::BufferTooLarge { operand, bytes, .. }) => {
                assert_eq!(operand, Operand::C);
                assert_eq!(bytes, (n * n * 4) as u64);
            }
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("a {n}x{n} output fit in one binding"),
        }
    }
}
