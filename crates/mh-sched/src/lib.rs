//! `mh-sched` - Thread placement and priority for matrix-harness.
//!
//! Workers in the harness all run under one placement policy: the same core
//! mask and, when privileges allow, the same fixed real-time priority. This
//! crate computes that policy and applies it to a thread. The policy travels
//! as an explicit [`SpawnAttributes`] value, not as ambient process state.

pub mod affinity;
pub mod attrs;
pub mod error;
pub mod priority;

pub use affinity::{online_cores, CoreAffinityMask};
pub use attrs::SpawnAttributes;
pub use error::{Result, SchedError};
pub use priority::{ElevationMode, RealtimeParams, RealtimePolicy, SchedulingElevator};
