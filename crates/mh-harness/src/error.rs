use std::io;
use std::path::PathBuf;

use mh_matrix::MatrixError;
use mh_sched::SchedError;
use thiserror::Error;

/// Outcome category of a run, numbered as the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Ok = 0,
    Fopen = 1,
    Fread = 2,
    Alloc = 3,
    Cpuset = 4,
    Config = 5,
    Spawn = 6,
}

impl ErrorCode {
    /// Fixed one-line description of the category.
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::Ok => "Success",
            ErrorCode::Fopen => "Failed to open entropy source",
            ErrorCode::Fread => "Failed to read from entropy source",
            ErrorCode::Alloc => "Failed to allocate memory",
            ErrorCode::Cpuset => "Could not link thread to all CPU cores",
            ErrorCode::Config => "Invalid configuration",
            ErrorCode::Spawn => "Failed to start worker thread",
        }
    }

    pub fn exit_status(self) -> i32 {
        self as i32
    }
}

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("cannot open '{}': {source}", .path.display())]
    EntropySourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot read seed from '{}': {source}", .path.display())]
    EntropyReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{0}")]
    AllocationFailed(#[source] MatrixError),
    #[error("{0}")]
    AffinityOrSchedulingFailed(#[from] SchedError),
    #[error("{0}")]
    InvalidConfiguration(String),
    #[error("worker {index}: {source}")]
    Spawn {
        index: usize,
        #[source]
        source: io::Error,
    },
}

impl HarnessError {
    pub fn code(&self) -> ErrorCode {
        match self {
            HarnessError::EntropySourceUnavailable { .. } => ErrorCode::Fopen,
            HarnessError::EntropyReadFailed { .. } => ErrorCode::Fread,
            HarnessError::AllocationFailed(_) => ErrorCode::Alloc,
            HarnessError::AffinityOrSchedulingFailed(_) => ErrorCode::Cpuset,
            HarnessError::InvalidConfiguration(_) => ErrorCode::Config,
            HarnessError::Spawn { .. } => ErrorCode::Spawn,
        }
    }
}

impl From<MatrixError> for HarnessError {
    fn from(e: MatrixError) -> Self {
        match e {
            MatrixError::Allocation { .. } => HarnessError::AllocationFailed(e),
            other => HarnessError::InvalidConfiguration(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
