use mh_sched::{CoreAffinityMask, SpawnAttributes};

use crate::config::RunConfig;

/// Builds the spawn attributes for a run.
///
/// Called on the coordinating thread after allocation and partitioning and
/// before any worker is launched.
pub trait Placement {
    fn prepare(&self, config: &RunConfig) -> mh_sched::Result<SpawnAttributes>;
}

/// Binds the calling thread to the configured cores of this machine and
/// raises it to the configured real-time policy.
#[derive(Debug, Clone, Default)]
pub struct OsPlacement;

impl OsPlacement {
    pub fn new() -> Self {
        OsPlacement
    }
}

impl Placement for OsPlacement {
    fn prepare(&self, config: &RunConfig) -> mh_sched::Result<SpawnAttributes> {
        let mask = CoreAffinityMask::for_online(config.core_count)?;
        SpawnAttributes::prepare(mask, config.elevation, config.policy)
    }
}
