use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatrixError {
    #[error("failed to allocate {height}x{width} matrix")]
    Allocation { height: usize, width: usize },
    #[error("matmul dimension mismatch: [{m}x{k}] @ [{k2}x{n}]")]
    DimensionMismatch {
        m: usize,
        k: usize,
        k2: usize,
        n: usize,
    },
    #[error("data length {len} does not match {height}x{width}")]
    LengthMismatch {
        len: usize,
        height: usize,
        width: usize,
    },
    #[error("cannot partition {rows} rows across {threads} workers")]
    InvalidPartition { rows: usize, threads: usize },
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, MatrixError>;
