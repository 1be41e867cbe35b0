use std::time::{Duration, Instant};

use mh_matrix::{multiply_rows, Matrix, MatrixError, Partition, RowsView, RowsViewMut};
use tracing::debug;

use crate::error::Result;

/// Start and end of one worker's compute, captured by the worker itself.
#[derive(Debug, Clone, Copy)]
pub struct WorkerTiming {
    pub index: usize,
    pub row_count: usize,
    pub start: Instant,
    pub end: Instant,
}

impl WorkerTiming {
    pub fn elapsed(&self) -> Duration {
        self.end.saturating_duration_since(self.start)
    }

    pub fn elapsed_ms(&self) -> f64 {
        millis(self.elapsed())
    }
}

pub(crate) fn millis(d: Duration) -> f64 {
    d.as_secs() as f64 * 1e3 + f64::from(d.subsec_nanos()) / 1e6
}

/// One partition's worth of the product.
///
/// Holds a read-only band of A, all of B, and the matching writable band of
/// the result.
#[derive(Debug)]
pub struct Worker<'a> {
    partition: Partition,
    a: RowsView<'a>,
    b: &'a Matrix,
    out: RowsViewMut<'a>,
}

impl<'a> Worker<'a> {
    /// Pair a partition with its operand band and output band.
    ///
    /// # Errors
    /// `DimensionMismatch` if A's width is not B's height or the output band
    /// is not `row_count x b.width()` at the partition's offset.
    pub fn new(
        partition: Partition,
        a: &'a Matrix,
        b: &'a Matrix,
        out: RowsViewMut<'a>,
    ) -> Result<Self> {
        let mismatch = || MatrixError::DimensionMismatch {
            m: a.height(),
            k: a.width(),
            k2: b.height(),
            n: b.width(),
        };
        if a.width() != b.height() || out.width() != b.width() {
            return Err(mismatch().into());
        }
        if partition.row_end() > a.height()
            || out.row_offset() != partition.row_offset
            || out.row_count() != partition.row_count
        {
            return Err(MatrixError::Other(format!(
                "output band [{}..{}) of {}-row A does not match partition {}",
                out.row_offset(),
                out.row_offset() + out.row_count(),
                a.height(),
                partition
            ))
            .into());
        }
        Ok(Worker {
            partition,
            a: a.rows(partition.row_offset..partition.row_end()),
            b,
            out,
        })
    }

    pub fn partition(&self) -> Partition {
        self.partition
    }

    /// Compute the band and report how long it took.
    pub fn run(self) -> WorkerTiming {
        let start = Instant::now();
        multiply_rows(self.a, self.b, self.out);
        let end = Instant::now();

        let timing = WorkerTiming {
            index: self.partition.index,
            row_count: self.partition.row_count,
            start,
            end,
        };
        debug!(
            worker = timing.index,
            rows = timing.row_count,
            ms = timing.elapsed_ms(),
            "worker finished"
        );
        timing
    }
}

/// One worker per partition, each owning its band of `result`.
pub fn build_workers<'a>(
    partitions: &[Partition],
    a: &'a Matrix,
    b: &'a Matrix,
    result: &'a mut Matrix,
) -> Result<Vec<Worker<'a>>> {
    let bands = result.split_rows_mut(partitions)?;
    partitions
        .iter()
        .zip(bands)
        .map(|(p, out)| Worker::new(*p, a, b, out))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mh_matrix::{MatmulBackend, Partitioner, SequentialBackend};

    fn operands() -> (Matrix, Matrix) {
        let a = Matrix::from_vec(4, 2, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let b = Matrix::from_vec(2, 3, vec![1, 0, 2, 0, 1, 3]).unwrap();
        (a, b)
    }

    #[test]
    fn test_workers_fill_whole_result() {
        let (a, b) = operands();
        let mut result = Matrix::zeros(4, 3).unwrap();
        let parts = Partitioner::default().partition(4, 3).unwrap();
        let timings: Vec<WorkerTiming> = build_workers(&parts, &a, &b, &mut result)
            .unwrap()
            .into_iter()
            .map(Worker::run)
            .collect();
        assert_eq!(timings.len(), 3);
        assert_eq!(timings[2].row_count, 2);
        assert_eq!(result, SequentialBackend::new().matmul(&a, &b).unwrap());
    }

    #[test]
    fn test_empty_partition_times_nothing() {
        let (a, b) = operands();
        let mut result = Matrix::zeros(4, 3).unwrap();
        let parts = Partitioner::default()
            .allow_empty(true)
            .partition(4, 6)
            .unwrap();
        let mut workers = build_workers(&parts, &a, &b, &mut result).unwrap();
        let t = workers.remove(0).run();
        assert_eq!(t.row_count, 0);
        assert!(t.end >= t.start);
        assert!(t.elapsed_ms() >= 0.0);
    }

    #[test]
    fn test_inner_dimension_mismatch() {
        let a = Matrix::zeros(2, 3).unwrap();
        let b = Matrix::zeros(2, 2).unwrap();
        let mut result = Matrix::zeros(2, 2).unwrap();
        let parts = Partitioner::default().partition(2, 1).unwrap();
        assert!(build_workers(&parts, &a, &b, &mut result).is_err());
    }

    #[test]
    fn test_result_height_mismatch() {
        let (a, b) = operands();
        let mut result = Matrix::zeros(3, 3).unwrap();
        let parts = Partitioner::default().partition(4, 2).unwrap();
        assert!(build_workers(&parts, &a, &b, &mut result).is_err());
    }
}
