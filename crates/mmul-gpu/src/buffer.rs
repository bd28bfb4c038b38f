//! Device-resident GEMM operands.

use crate::{GpuDevice, GpuError};
use std::fmt;

/// Role of a matrix in C = A @ B.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    A,
    B,
    C,
}

impl Operand {
    fn label(self) -> &'static str {
        match self {
            Self::A => "mmul-gpu operand A",
            Self::B => "mmul-gpu operand B",
            Self::C => "mmul-gpu operand C",
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        };
        f.write_str(name)
    }
}

/// Bytes needed to bind `len` f32 elements, if that fits in `limit`.
pub(crate) fn binding_bytes(operand: Operand, len: usize, limit: u64) -> Result<u64, GpuError> {
    let bytes = (len as u64).saturating_mul(std::mem::size_of::<f32>() as u64);
    if bytes > limit {
        return Err(GpuError::BufferTooLarge { operand, bytes, limit });
    }
    Ok(bytes)
}

/// One GEMM operand living in a storage buffer.
///
/// Creation fails when the operand does not fit in a single storage
/// binding on the device.
pub struct GpuBuffer {
    pub(crate) buffer: wgpu::Buffer,
    operand: Operand,
    len: usize,
}

impl GpuBuffer {
    /// Upload a host operand.
    pub fn upload(device: &GpuDevice, operand: Operand, data: &[f32]) -> Result<Self, GpuError> {
        binding_bytes(operand, data.len(), device.max_binding_bytes())?;
        use wgpu::util::DeviceExt;
        let buffer = device
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(operand.label()),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            });
        Ok(Self { buffer, operand, len: data.len() })
    }

    /// Allocate an output operand of `len` elements; contents are undefined
    /// until a kernel writes them.
    pub fn allocate(device: &GpuDevice, operand: Operand, len: usize) -> Result<Self, GpuError> {
        let size = binding_bytes(operand, len, device.max_binding_bytes())?;
        let buffer = device.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(operand.label()),
            size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        Ok(Self { buffer, operand, len })
    }

    pub fn operand(&self) -> Operand {
        self.operand
    }

    /// Number of f32 elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Copy the operand back to the host, blocking until the copy lands.
    pub fn read_back(&self, device: &GpuDevice) -> Result<Vec<f32>, GpuError> {
        let size = (self.len * std::mem::size_of::<f32>()) as u64;
        let staging = device.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("mmul-gpu readback"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = device
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("mmul-gpu readback copy"),
            });
        encoder.copy_buffer_to_buffer(&self.buffer, 0, &staging, 0, size);
        let copied = device.queue.submit(std::iter::once(encoder.finish()));

        let (tx, rx) = std::sync::mpsc::channel();
        staging
            .slice(..)
            .map_async(wgpu::MapMode::Read, move |mapped| {
                tx.send(mapped).ok();
            });
        device
            .device
            .poll(wgpu::Maintain::WaitForSubmissionIndex(copied));
        match rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(GpuError::Map(e.to_string())),
            Err(_) => return Err(GpuError::Map(format!("operand {} was never mapped", self.operand))),
        }

        let host = bytemuck::cast_slice::<u8, f32>(&staging.slice(..).get_mapped_range()).to_vec();
        staging.unmap();
        tracing::debug!(operand = %self.operand, len = self.len, "read back");
        Ok(host)
    }
}
