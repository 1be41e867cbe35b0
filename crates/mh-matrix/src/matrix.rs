use std::ops::Range;

use rand::Rng;

use crate::error::{MatrixError, Result};
use crate::partition::Partition;
use crate::view::{RowsView, RowsViewMut};

/// Largest value produced by [`Matrix::random`].
pub const RANDOM_MAX: i32 = 100;

/// A dense, row-major matrix of `i32`.
///
/// Storage is a single contiguous buffer of `height * width` elements. Row
/// `r` occupies `data[r * width..(r + 1) * width]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    data: Vec<i32>,
    height: usize,
    width: usize,
}

impl Matrix {
    /// Create a zero-filled matrix.
    ///
    /// # Errors
    /// Returns `MatrixError::Allocation` if `height * width` overflows or the
    /// allocator cannot provide the buffer.
    pub fn zeros(height: usize, width: usize) -> Result<Self> {
        let data = alloc_zeroed(height, width)?;
        Ok(Matrix {
            data,
            height,
            width,
        })
    }

    /// Create a matrix filled with uniform values in `[0, RANDOM_MAX]`.
    pub fn random<R: Rng + ?Sized>(height: usize, width: usize, rng: &mut R) -> Result<Self> {
        let mut m = Self::zeros(height, width)?;
        for v in m.data.iter_mut() {
            *v = rng.gen_range(0..=RANDOM_MAX);
        }
        Ok(m)
    }

    /// Wrap an existing row-major buffer.
    pub fn from_vec(height: usize, width: usize, data: Vec<i32>) -> Result<Self> {
        if height.checked_mul(width) != Some(data.len()) {
            return Err(MatrixError::LengthMismatch {
                len: data.len(),
                height,
                width,
            });
        }
        Ok(Matrix {
            data,
            height,
            width,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Row `r` as a slice.
    ///
    /// # Panics
    /// Panics if `r >= height`.
    pub fn row(&self, r: usize) -> &[i32] {
        assert!(r < self.height, "row {} out of bounds (height {})", r, self.height);
        &self.data[r * self.width..(r + 1) * self.width]
    }

    /// The underlying row-major buffer.
    pub fn as_slice(&self) -> &[i32] {
        &self.data
    }

    /// Read-only view of a contiguous row range.
    ///
    /// # Panics
    /// Panics if the range extends past `height`.
    pub fn rows(&self, range: Range<usize>) -> RowsView<'_> {
        RowsView::new(&self.data, self.height, self.width, range.start, range.len())
    }

    /// Carve the buffer into one mutable view per partition.
    ///
    /// Partitions must be in ascending order and tile `[0, height)` exactly.
    /// The views never alias, so workers can write them concurrently without
    /// synchronization.
    pub fn split_rows_mut(&mut self, partitions: &[Partition]) -> Result<Vec<RowsViewMut<'_>>> {
        let width = self.width;
        let mut rest: &mut [i32] = &mut self.data;
        let mut cursor = 0usize;
        let mut views = Vec::with_capacity(partitions.len());

        for p in partitions {
            if p.row_offset != cursor || cursor + p.row_count > self.height {
                return Err(MatrixError::Other(format!(
                    "partition {} [{}..{}) does not continue at row {} of {}",
                    p.index,
                    p.row_offset,
                    p.row_offset + p.row_count,
                    cursor,
                    self.height
                )));
            }
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(p.row_count * width);
            views.push(RowsViewMut::new(head, p.row_offset, p.row_count, width));
            rest = tail;
            cursor += p.row_count;
        }

        if cursor != self.height {
            return Err(MatrixError::Other(format!(
                "partitions cover {} of {} rows",
                cursor, self.height
            )));
        }
        Ok(views)
    }
}

fn alloc_zeroed(height: usize, width: usize) -> Result<Vec<i32>> {
    let err = || MatrixError::Allocation { height, width };
    let len = height.checked_mul(width).ok_or_else(err)?;
    let mut data = Vec::new();
    data.try_reserve_exact(len).map_err(|_| err())?;
    data.resize(len, 0);
    Ok(data)
}
