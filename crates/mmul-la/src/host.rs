//! Portable host GEMM loops.

use crate::matrix::check_gemm_shapes;
use crate::{LaError, Matrix};

/// C = A * B with the i/j/k loop nest the device kernel uses: each output
/// element is one dot product of a row of A and a column of B.
pub fn gemm_naive(a: &Matrix, b: &Matrix, c: &mut Matrix) -> Result<(), LaError> {
    check_gemm_shapes(a, b, c)?;
    let (m, k) = a.shape();
    let n = b.ncols();
    let (a, b) = (a.as_slice(), b.as_slice());
    let c = c.as_mut_slice();
    for i in 0..m {
        for j in 0..n {
            let mut sum = 0.0f32;
            for p in 0..k {
                sum += a[i * k + p] * b[p * n + j];
            }
            c[i * n + j] = sum;
        }
    }
    Ok(())
}

/// C = A * B with the i/k/j loop order, streaming rows of B and C.
///
/// Used as the reference when no BLAS is linked.
pub fn gemm_blocked(a: &Matrix, b: &Matrix, c: &mut Matrix) -> Result<(), LaError> {
    check_gemm_shapes(a, b, c)?;
    let k = a.ncols();
    let n = b.ncols();
    let b = b.as_slice();
    c.fill_zero();
    if k == 0 || n == 0 {
        return Ok(());
    }
    for (a_row, c_row) in a.as_slice().chunks_exact(k).zip(c.as_mut_slice().chunks_exact_mut(n)) {
        for (p, &a_ip) in a_row.iter().enumerate() {
            let b_row = &b[p * n..(p + 1) * n];
            for (c_ij, &b_pj) in c_row.iter_mut().zip(b_row) {
                *c_ij += a_ip * b_pj;
            }
        }
    }
    Ok(())
}
