use std::fmt;

use tracing::debug;

use crate::error::{MatrixError, Result};

/// Where the rows left over after even division go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemainderPolicy {
    /// The last partition absorbs all `height % threads` leftover rows.
    ///
    /// This can leave the last worker with up to `threads - 1` extra rows.
    #[default]
    Last,
}

/// A contiguous range of rows assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    /// Worker index, `0..threads`.
    pub index: usize,
    /// First row of the range.
    pub row_offset: usize,
    /// Number of rows in the range; may be 0 under tolerant partitioning.
    pub row_count: usize,
}

impl Partition {
    /// One past the last row.
    pub fn row_end(&self) -> usize {
        self.row_offset + self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} [{}..{})", self.index, self.row_offset, self.row_end())
    }
}

/// Splits the rows of the left operand into one static range per worker.
///
/// Every partition gets `height / threads` rows; the remainder is placed
/// according to the configured [`RemainderPolicy`]. The result always tiles
/// `[0, height)` exactly, in ascending order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Partitioner {
    remainder: RemainderPolicy,
    allow_empty: bool,
}

impl Partitioner {
    pub fn new(remainder: RemainderPolicy) -> Self {
        Partitioner {
            remainder,
            allow_empty: false,
        }
    }

    /// Accept `threads > height`, producing zero-row partitions for the
    /// surplus workers instead of an error.
    pub fn allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }

    /// Produce exactly `threads` partitions covering `[0, height)`.
    ///
    /// # Errors
    /// `MatrixError::InvalidPartition` if `height` or `threads` is zero, or if
    /// `threads > height` and empty partitions are not allowed.
    pub fn partition(&self, height: usize, threads: usize) -> Result<Vec<Partition>> {
        let invalid = || MatrixError::InvalidPartition {
            rows: height,
            threads,
        };
        if height == 0 || threads == 0 {
            return Err(invalid());
        }
        if threads > height && !self.allow_empty {
            return Err(invalid());
        }

        let slice = height / threads;
        let rest = height % threads;

        let parts: Vec<Partition> = (0..threads)
            .map(|index| {
                let extra = match self.remainder {
                    RemainderPolicy::Last if index == threads - 1 => rest,
                    RemainderPolicy::Last => 0,
                };
                Partition {
                    index,
                    row_offset: index * slice,
                    row_count: slice + extra,
                }
            })
            .collect();

        debug!(
            height,
            threads,
            slice,
            rest,
            last = parts[threads - 1].row_count,
            "partitioned rows"
        );
        Ok(parts)
    }
}
