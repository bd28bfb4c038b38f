/// Error type for host linear-algebra operations.
#[derive(Debug, thiserror::Error)]
pub enum LaError {
    /// Operand shapes do not compose: A is `a`, B is `b`, C is `c` (rows × cols).
    #[error("dimension mismatch: A {a:?} * B {b:?} -> C {c:?}")]
    DimensionMismatch {
        a: (usize, usize),
        b: (usize, usize),
        c: (usize, usize),
    },
    /// Two buffers that must hold the same number of elements do not.
    #[error("length mismatch: expected {expected} elements, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    /// The BLAS reference was requested but no BLAS is linked into this build.
    #[error("cblas_sgemm is not available; rebuild with the `accelerate` or `openblas` feature")]
    BlasUnavailable,
}
