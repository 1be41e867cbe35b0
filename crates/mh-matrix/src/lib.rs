//! `mh-matrix` - Matrix storage and partitioning for matrix-harness.
//!
//! This crate provides:
//! - A row-major `Matrix` of `i32` with fallible allocation
//! - Non-owning row views (`RowsView`, `RowsViewMut`) over contiguous row ranges
//! - A static `Partitioner` that splits rows across workers
//! - The row kernel every worker runs, and a `SequentialBackend` reference

pub mod backend;
pub mod cpu;
pub mod error;
pub mod matrix;
pub mod partition;
pub mod view;

// Re-export primary types at the crate root for convenience.
pub use backend::MatmulBackend;
pub use cpu::matmul::multiply_rows;
pub use cpu::SequentialBackend;
pub use error::{MatrixError, Result};
pub use matrix::Matrix;
pub use partition::{Partition, Partitioner, RemainderPolicy};
pub use view::{RowsView, RowsViewMut};
