use crate::buffer::Operand;

/// Error type for GPU operations.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    /// No suitable GPU adapter found.
    #[error("no suitable GPU adapter found")]
    NoAdapter,
    /// Device request failed.
    #[error("GPU device error: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    /// A matrix does not fit in one storage binding on this device.
    #[error("operand {operand} needs {bytes} bytes, device storage binding limit is {limit}")]
    BufferTooLarge { operand: Operand, bytes: u64, limit: u64 },
    /// Input lengths do not match the GEMM shape, or the shape is empty.
    #[error("bad GEMM operands: {0}")]
    Dimension(String),
    /// Reading a buffer back to the host failed.
    #[error("buffer map failed: {0}")]
    Map(String),
}
