use std::fmt;

use tracing::debug;

use crate::error::{Result, SchedError};

/// Number of cores currently online.
///
/// Uses `sysconf(_SC_NPROCESSORS_ONLN)`, falling back to
/// `std::thread::available_parallelism` if that reports nothing useful.
pub fn online_cores() -> usize {
    // SAFETY: sysconf has no preconditions.
    let n = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
    if n > 0 {
        return n as usize;
    }
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1)
}

/// The set of cores a worker may run on.
///
/// Always the lowest-numbered `len()` cores of the `available` online ones,
/// and never empty. One mask is shared by every worker of a run; there is no
/// per-worker pinning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreAffinityMask {
    cores: Vec<usize>,
    available: usize,
}

impl CoreAffinityMask {
    /// Select the first `requested` of `available` cores.
    ///
    /// `requested <= 0` selects all of them; a request above `available`
    /// is capped at `available`.
    ///
    /// # Errors
    /// `SchedError::NoCores` if `available == 0`.
    pub fn compute(requested: i64, available: usize) -> Result<Self> {
        if available == 0 {
            return Err(SchedError::NoCores);
        }
        let take = if requested <= 0 {
            available
        } else {
            usize::try_from(requested).map_or(available, |r| r.min(available))
        };
        Ok(CoreAffinityMask {
            cores: (0..take).collect(),
            available,
        })
    }

    /// Like [`CoreAffinityMask::compute`] against [`online_cores`].
    pub fn for_online(requested: i64) -> Result<Self> {
        Self::compute(requested, online_cores())
    }

    /// Selected core ids, ascending.
    pub fn cores(&self) -> &[usize] {
        &self.cores
    }

    pub fn contains(&self, core: usize) -> bool {
        self.cores.binary_search(&core).is_ok()
    }

    pub fn len(&self) -> usize {
        self.cores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }

    /// Number of online cores the mask was computed against.
    pub fn available(&self) -> usize {
        self.available
    }

    /// Restrict the calling thread to this mask.
    ///
    /// Reads the current affinity first so each core's transition can be
    /// logged, then writes the new set.
    #[cfg(target_os = "linux")]
    pub fn apply_to_current(&self) -> Result<()> {
        use nix::sched::{sched_getaffinity, sched_setaffinity, CpuSet};
        use nix::unistd::Pid;

        let this = Pid::from_raw(0);
        let before = sched_getaffinity(this).map_err(|source| SchedError::Affinity {
            op: "read",
            source,
        })?;

        let mut set = CpuSet::new();
        for core in 0..self.available {
            let was = before.is_set(core).unwrap_or(false);
            let on = self.contains(core);
            if on {
                set.set(core)
                    .map_err(|_| SchedError::CoreOutOfRange { core })?;
            }
            debug!(core, was, now = on, "core affinity");
        }

        sched_setaffinity(this, &set).map_err(|source| SchedError::Affinity {
            op: "write",
            source,
        })
    }

    #[cfg(not(target_os = "linux"))]
    pub fn apply_to_current(&self) -> Result<()> {
        Err(SchedError::Unsupported)
    }
}

impl fmt::Display for CoreAffinityMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.cores.first(), self.cores.last()) {
            (Some(first), Some(last)) => {
                write!(f, "{}-{} of {}", first, last, self.available)
            }
            _ => write!(f, "none of {}", self.available),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_selects_all() {
        let m = CoreAffinityMask::compute(0, 8).unwrap();
        assert_eq!(m.cores(), &[0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(m.len(), 8);
    }

    #[test]
    fn test_negative_selects_all() {
        let m = CoreAffinityMask::compute(-4, 4).unwrap();
        assert_eq!(m.cores(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_first_n_cores() {
        let m = CoreAffinityMask::compute(3, 8).unwrap();
        assert_eq!(m.cores(), &[0, 1, 2]);
        assert!(m.contains(2));
        assert!(!m.contains(3));
    }

    #[test]
    fn test_request_above_available_is_capped() {
        let m = CoreAffinityMask::compute(64, 4).unwrap();
        assert_eq!(m.cores(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_no_cores_is_error() {
        assert!(matches!(
            CoreAffinityMask::compute(0, 0),
            Err(SchedError::NoCores)
        ));
    }

    #[test]
    fn test_never_empty() {
        for req in -2..10 {
            let m = CoreAffinityMask::compute(req, 5).unwrap();
            assert!(!m.is_empty());
        }
    }

    #[test]
    fn test_display() {
        let m = CoreAffinityMask::compute(2, 8).unwrap();
        assert_eq!(m.to_string(), "0-1 of 8");
    }

    #[test]
    fn test_online_cores_positive() {
        assert!(online_cores() >= 1);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_apply_all_cores_on_worker_thread() {
        // Run on a scratch thread so the test harness thread keeps its mask.
        let res = std::thread::spawn(|| CoreAffinityMask::for_online(0)?.apply_to_current())
            .join()
            .unwrap();
        assert!(res.is_ok(), "{:?}", res);
    }
}
