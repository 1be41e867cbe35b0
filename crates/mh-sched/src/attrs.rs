use tracing::{debug, warn};

use crate::affinity::CoreAffinityMask;
use crate::error::Result;
use crate::priority::{ElevationMode, RealtimeParams, RealtimePolicy, SchedulingElevator};

/// Placement and priority handed explicitly to every spawned worker.
///
/// Built once on the orchestrating thread by [`SpawnAttributes::prepare`],
/// then shared read-only. Each worker calls [`SpawnAttributes::enter`] as its
/// first action so it runs under the same mask and priority as its siblings.
#[derive(Debug, Clone)]
pub struct SpawnAttributes {
    mask: CoreAffinityMask,
    realtime: Option<RealtimeParams>,
}

impl SpawnAttributes {
    /// Elevate and bind the calling thread, then capture the result.
    ///
    /// Priority is raised first, then the mask is applied. An affinity failure
    /// is always fatal; a priority failure is fatal only under
    /// `ElevationMode::Required`.
    pub fn prepare(
        mask: CoreAffinityMask,
        mode: ElevationMode,
        policy: RealtimePolicy,
    ) -> Result<Self> {
        let realtime = match mode {
            ElevationMode::Disabled => None,
            ElevationMode::Required => {
                Some(SchedulingElevator::new(policy)?.elevate_current()?)
            }
            ElevationMode::BestEffort => {
                match SchedulingElevator::new(policy).and_then(|e| e.elevate_current()) {
                    Ok(params) => Some(params),
                    Err(e) => {
                        warn!(error = %e, %policy, "real-time scheduling unavailable, using default policy");
                        None
                    }
                }
            }
        };

        mask.apply_to_current()?;
        debug!(mask = %mask, ?realtime, "spawn attributes prepared");
        Ok(SpawnAttributes { mask, realtime })
    }

    /// Attributes that apply only a core mask.
    pub fn with_mask(mask: CoreAffinityMask) -> Self {
        SpawnAttributes {
            mask,
            realtime: None,
        }
    }

    pub fn mask(&self) -> &CoreAffinityMask {
        &self.mask
    }

    /// The real-time parameters in force, if elevation succeeded.
    pub fn realtime(&self) -> Option<RealtimeParams> {
        self.realtime
    }

    /// Apply these attributes to the calling thread.
    pub fn enter(&self) -> Result<()> {
        if let Some(params) = &self.realtime {
            params.apply_to_current()?;
        }
        self.mask.apply_to_current()
    }
}
