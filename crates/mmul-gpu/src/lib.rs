//! GEMM offload to the GPU via wgpu.
//!
//! The offload region mirrors a directive-based target region: inputs are
//! uploaded once ([`Offload::enter`]), the kernel is dispatched and the host
//! blocks until it finishes ([`Offload::run`]), and the output is copied back
//! ([`Offload::exit`]).

mod buffer;
mod device;
mod error;
mod kernel;
mod matmul;

pub use buffer::{GpuBuffer, Operand};
pub use device::{AdapterSummary, GpuDevice};
pub use error::GpuError;
pub use kernel::{GemmPipeline, GemmShape, Kernel, TILE_SIZE};
pub use matmul::{gemm, Offload};
