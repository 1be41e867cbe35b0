//! `mh-harness` - Parallel dense matrix multiplication with timing.
//!
//! A [`Coordinator`] seeds and fills two random operands, splits the rows of
//! the left operand into static partitions, and runs one [`Worker`] per
//! partition through a [`Launcher`]. Workers share the operands read-only and
//! each owns a disjoint band of the result, so the parallel phase needs no
//! locks. The run ends with a [`Report`] of per-worker and wall-clock time.

pub mod config;
pub mod coordinator;
pub mod entropy;
pub mod error;
pub mod launcher;
pub mod placement;
pub mod report;
pub mod worker;

pub use config::RunConfig;
pub use coordinator::{Coordinator, Outcome};
pub use entropy::{DeviceSeed, FixedSeed, SeedSource, DEFAULT_ENTROPY_PATH};
pub use error::{ErrorCode, HarnessError, Result};
pub use launcher::{InlineLauncher, Launcher, ThreadLauncher};
pub use placement::{OsPlacement, Placement};
pub use report::Report;
pub use worker::{Worker, WorkerTiming};
