use std::fmt::Debug;

use crate::error::Result;
use crate::matrix::Matrix;

/// Trait for complete matrix-multiplication strategies.
///
/// A backend takes two operands and returns a freshly allocated product.
/// The parallel harness does not go through this trait; it drives the row
/// kernel directly. Backends exist as reference oracles and baselines.
pub trait MatmulBackend: Send + Sync + Debug {
    /// Returns the name of this backend (e.g., "sequential").
    fn name(&self) -> &str;

    /// Matrix multiplication: C = A @ B.
    ///
    /// - `a`: shape [m, k]
    /// - `b`: shape [k, n]
    /// - Returns: shape [m, n]
    fn matmul(&self, a: &Matrix, b: &Matrix) -> Result<Matrix>;
}
