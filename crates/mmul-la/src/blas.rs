//! Safe wrappers around the CBLAS `sgemm` routine.
//!
//! The symbol comes from Accelerate (macOS, `accelerate` feature) or
//! OpenBLAS (`openblas` feature). Without either, `AVAILABLE` is false and
//! [`gemm`] reports [`LaError::BlasUnavailable`].

use crate::matrix::check_gemm_shapes;
use crate::{LaError, Matrix};

/// Whether a BLAS was linked into this build.
pub const AVAILABLE: bool = cfg!(blas);

pub const CBLAS_ROW_MAJOR: i32 = 101;
pub const CBLAS_COL_MAJOR: i32 = 102;
pub const CBLAS_NO_TRANS: i32 = 111;
pub const CBLAS_TRANS: i32 = 112;

#[cfg(blas)]
extern "C" {
    fn cblas_sgemm(
        order: i32,
        transa: i32,
        transb: i32,
        m: i32,
        n: i32,
        k: i32,
        alpha: f32,
        a: *const f32,
        lda: i32,
        b: *const f32,
        ldb: i32,
        beta: f32,
        c: *mut f32,
        ldc: i32,
    );
}

/// Raw `cblas_sgemm`: C = alpha * op(A) * op(B) + beta * C.
///
/// # Safety
/// Pointers must be valid for the given dimensions and leading strides.
#[cfg(blas)]
#[inline]
#[allow(clippy::too_many_arguments)]
pub unsafe fn sgemm(
    order: i32,
    transa: i32,
    transb: i32,
    m: i32,
    n: i32,
    k: i32,
    alpha: f32,
    a: *const f32,
    lda: i32,
    b: *const f32,
    ldb: i32,
    beta: f32,
    c: *mut f32,
    ldc: i32,
) {
    cblas_sgemm(order, transa, transb, m, n, k, alpha, a, lda, b, ldb, beta, c, ldc);
}

/// C = alpha * A * B + beta * C, all row-major.
pub fn gemm(a: &Matrix, b: &Matrix, c: &mut Matrix, alpha: f32, beta: f32) -> Result<(), LaError> {
    check_gemm_shapes(a, b, c)?;
    gemm_unchecked(a, b, c, alpha, beta)
}

#[cfg(blas)]
fn gemm_unchecked(a: &Matrix, b: &Matrix, c: &mut Matrix, alpha: f32, beta: f32) -> Result<(), LaError> {
    let (m, k) = a.shape();
    let n = b.ncols();
    tracing::debug!(m, n, k, "cblas_sgemm");
    unsafe {
        sgemm(
            CBLAS_ROW_MAJOR,
            CBLAS_NO_TRANS,
            CBLAS_NO_TRANS,
            m as i32,
            n as i32,
            k as i32,
            alpha,
            a.as_slice().as_ptr(),
            k as i32,
            b.as_slice().as_ptr(),
            n as i32,
            beta,
            c.as_mut_slice().as_mut_ptr(),
            n as i32,
        );
    }
    Ok(())
}

#[cfg(not(blas))]
fn gemm_unchecked(_: &Matrix, _: &Matrix, _: &mut Matrix, _: f32, _: f32) -> Result<(), LaError> {
    Err(LaError::BlasUnavailable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_shapes_before_calling_blas() {
        let a = Matrix::zeros(2, 3);
        let b = Matrix::zeros(2, 3);
        let mut c = Matrix::zeros(2, 3);
        let err = gemm(&a, &b, &mut c, 1.0, 0.0).unwrap_err();
        assert!(matches!(err, LaError::DimensionMismatch { .. }));
    }

    #[cfg(blas)]
    #[test]
    fn blas_rectangular() {
        let a = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let b = Matrix::from_vec(3, 2, vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0]).unwrap();
        let mut c = Matrix::zeros(2, 2);
        gemm(&a, &b, &mut c, 1.0, 0.0).unwrap();
        assert_eq!(c.as_slice(), &[58.0, 64.0, 139.0, 154.0]);
    }

    #[cfg(blas)]
    #[test]
    fn blas_accumulates_with_beta() {
        let a = Matrix::identity(2);
        let b = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let mut c = Matrix::from_vec(2, 2, vec![1.0; 4]).unwrap();
        gemm(&a, &b, &mut c, 1.0, 1.0).unwrap();
        assert_eq!(c.as_slice(), &[2.0, 3.0, 4.0, 5.0]);
    }

    #[cfg(not(blas))]
    #[test]
    fn unavailable_without_blas() {
        let a = Matrix::identity(2);
        let mut c = Matrix::zeros(2, 2);
        assert!(!AVAILABLE);
        assert!(matches!(gemm(&a, &a, &mut c, 1.0, 0.0), Err(LaError::BlasUnavailable)));
    }
}
