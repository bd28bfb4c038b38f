//! Host-side linear algebra for the SGEMM benchmark.
//!
//! Row-major `f32` matrices, `cblas_sgemm` bindings (when a BLAS is linked
//! through the `accelerate` or `openblas` feature), portable host GEMM loops
//! and result checking against a reference product.

pub mod blas;
mod check;
mod error;
pub mod host;
mod matrix;
mod reference;

pub use check::{check_result, CheckReport, Mismatch};
pub use error::LaError;
pub use matrix::Matrix;
pub use reference::Reference;
