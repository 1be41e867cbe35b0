pub mod matmul;

use crate::backend::MatmulBackend;
use crate::error::{MatrixError, Result};
use crate::matrix::Matrix;

/// Single-threaded reference backend.
///
/// A straightforward triple loop over the whole product, kept independent of
/// the row kernel so it can serve as an oracle for the parallel path.
#[derive(Debug, Clone)]
pub struct SequentialBackend;

impl SequentialBackend {
    pub fn new() -> Self {
        SequentialBackend
    }
}

impl Default for SequentialBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MatmulBackend for SequentialBackend {
    fn name(&self) -> &str {
        "sequential"
    }

    fn matmul(&self, a: &Matrix, b: &Matrix) -> Result<Matrix> {
        let (m, k) = (a.height(), a.width());
        let (k2, n) = (b.height(), b.width());
        if k != k2 {
            return Err(MatrixError::DimensionMismatch { m, k, k2, n });
        }

        let a = a.as_slice();
        let b = b.as_slice();
        let mut c = vec![0i32; m * n];
        for i in 0..m {
            for j in 0..n {
                let mut sum = 0i32;
                for p in 0..k {
                    sum = sum.wrapping_add(a[i * k + p].wrapping_mul(b[p * n + j]));
                }
                c[i * n + j] = sum;
            }
        }
        Matrix::from_vec(m, n, c)
    }
}
