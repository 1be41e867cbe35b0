use crate::matrix::Matrix;
use crate::view::{RowsView, RowsViewMut};

/// Multiply a band of rows of A by the whole of B into the matching band of C.
///
/// For every local row `i` and column `j`:
///   `out[i][j] = sum_k a[i][k] * b[k][j]`
///
/// Arithmetic wraps on overflow. An empty band writes nothing.
///
/// # Panics
/// Panics if `a.width() != b.height()`, `out.width() != b.width()`, or the
/// two views differ in row count.
pub fn multiply_rows(a: RowsView<'_>, b: &Matrix, mut out: RowsViewMut<'_>) {
    assert_eq!(a.width(), b.height(), "inner dimensions differ");
    assert_eq!(out.width(), b.width(), "output width differs from B");
    assert_eq!(a.row_count(), out.row_count(), "band heights differ");

    let k_dim = a.width();
    let n = b.width();
    let b_data = b.as_slice();

    for i in 0..a.row_count() {
        let a_row = a.row(i);
        let out_row = out.row_mut(i);
        for (j, cell) in out_row.iter_mut().enumerate() {
            let mut sum = 0i32;
            for k in 0..k_dim {
                sum = sum.wrapping_add(a_row[k].wrapping_mul(b_data[k * n + j]));
            }
            *cell = sum;
        }
    }
}
