/// A read-only view of `row_count` consecutive rows of a row-major buffer.
///
/// The view borrows the buffer; it never copies. Row indices passed to
/// [`RowsView::row`] are local to the view.
#[derive(Debug, Clone, Copy)]
pub struct RowsView<'a> {
    data: &'a [i32],
    row_offset: usize,
    row_count: usize,
    width: usize,
}

impl<'a> RowsView<'a> {
    /// Create a view over rows `[row_offset, row_offset + row_count)` of a
    /// `height x width` buffer.
    ///
    /// # Panics
    /// Panics if the range extends past `height` or the buffer is shorter
    /// than `height * width`.
    pub fn new(
        buffer: &'a [i32],
        height: usize,
        width: usize,
        row_offset: usize,
        row_count: usize,
    ) -> Self {
        assert!(
            row_offset + row_count <= height,
            "rows [{}..{}) out of bounds (height {})",
            row_offset,
            row_offset + row_count,
            height
        );
        assert!(buffer.len() >= height * width);
        let start = row_offset * width;
        RowsView {
            data: &buffer[start..start + row_count * width],
            row_offset,
            row_count,
            width,
        }
    }

    /// Local row `i` of the view.
    pub fn row(&self, i: usize) -> &'a [i32] {
        assert!(i < self.row_count, "row {} out of view of {} rows", i, self.row_count);
        let data: &'a [i32] = self.data;
        &data[i * self.width..(i + 1) * self.width]
    }

    /// First row of the view in the parent matrix.
    pub fn row_offset(&self) -> usize {
        self.row_offset
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }
}

/// A mutable view of consecutive rows, handed to exactly one writer.
///
/// Produced by [`crate::Matrix::split_rows_mut`]; sibling views cover
/// disjoint rows of the same matrix.
#[derive(Debug)]
pub struct RowsViewMut<'a> {
    data: &'a mut [i32],
    row_offset: usize,
    row_count: usize,
    width: usize,
}

impl<'a> RowsViewMut<'a> {
    /// Wrap an already-sliced region of `row_count * width` elements.
    ///
    /// # Panics
    /// Panics if `data.len() != row_count * width`.
    pub fn new(data: &'a mut [i32], row_offset: usize, row_count: usize, width: usize) -> Self {
        assert_eq!(
            data.len(),
            row_count * width,
            "view of {} rows x {} cols needs {} elements, got {}",
            row_count,
            width,
            row_count * width,
            data.len()
        );
        RowsViewMut {
            data,
            row_offset,
            row_count,
            width,
        }
    }

    /// Mutable local row `i`.
    pub fn row_mut(&mut self, i: usize) -> &mut [i32] {
        assert!(i < self.row_count, "row {} out of view of {} rows", i, self.row_count);
        &mut self.data[i * self.width..(i + 1) * self.width]
    }

    pub fn as_mut_slice(&mut self) -> &mut [i32] {
        &mut *self.data
    }

    pub fn row_offset(&self) -> usize {
        self.row_offset
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }
}
