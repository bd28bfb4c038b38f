use crate::LaError;
use std::ops::{Index, IndexMut};

/// Heap-allocated row-major `f32` matrix.
///
/// Element (row, col) is stored at `data[row * ncols + col]`, which is the
/// layout both `cblas_sgemm(CblasRowMajor, ..)` and the device kernels expect.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    data: Vec<f32>,
    nrows: usize,
    ncols: usize,
}

impl Matrix {
    /// Zero matrix.
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self { data: vec![0.0; nrows * ncols], nrows, ncols }
    }

    /// Square zero matrix.
    pub fn square(n: usize) -> Self {
        Self::zeros(n, n)
    }

    /// Create from raw row-major data.
    pub fn from_vec(nrows: usize, ncols: usize, data: Vec<f32>) -> Result<Self, LaError> {
        if data.len() != nrows * ncols {
            return Err(LaError::LengthMismatch {
                expected: nrows * ncols,
                actual: data.len(),
            });
        }
        Ok(Self { data, nrows, ncols })
    }

    /// Create from a function of (row, col).
    pub fn from_fn(nrows: usize, ncols: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(nrows * ncols);
        for i in 0..nrows {
            for j in 0..ncols {
                data.push(f(i, j));
            }
        }
        Self { data, nrows, ncols }
    }

    /// Identity matrix.
    pub fn identity(n: usize) -> Self {
        Self::from_fn(n, n, |i, j| if i == j { 1.0 } else { 0.0 })
    }

    #[inline]
    pub fn nrows(&self) -> usize { self.nrows }

    #[inline]
    pub fn ncols(&self) -> usize { self.ncols }

    /// (rows, cols)
    #[inline]
    pub fn shape(&self) -> (usize, usize) { (self.nrows, self.ncols) }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize { self.data.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    #[inline]
    pub fn is_square(&self) -> bool { self.nrows == self.ncols }

    /// Element access (row, col).
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.ncols + col]
    }

    /// Set element.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, val: f32) {
        self.data[row * self.ncols + col] = val;
    }

    /// Raw row-major data.
    #[inline]
    pub fn as_slice(&self) -> &[f32] { &self.data }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] { &mut self.data }

    /// Row slice.
    pub fn row(&self, i: usize) -> &[f32] {
        let start = i * self.ncols;
        &self.data[start..start + self.ncols]
    }

    /// Reset every element to zero.
    pub fn fill_zero(&mut self) {
        self.data.iter_mut().for_each(|x| *x = 0.0);
    }

    pub fn into_vec(self) -> Vec<f32> { self.data }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f32;
    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &f32 {
        &self.data[row * self.ncols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f32 {
        &mut self.data[row * self.ncols + col]
    }
}

/// Checks that C = A * B is well-formed.
pub(crate) fn check_gemm_shapes(a: &Matrix, b: &Matrix, c: &Matrix) -> Result<(), LaError> {
    if a.ncols != b.nrows || c.nrows != a.nrows || c.ncols != b.ncols {
        return Err(LaError::DimensionMismatch {
            a: a.shape(),
            b: b.shape(),
            c: c.shape(),
        });
    }
    Ok(())
}
