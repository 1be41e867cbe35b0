use std::fmt;
use std::io;

use crate::error::{Result, SchedError};

/// Fixed-priority real-time scheduling classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RealtimePolicy {
    /// `SCHED_FIFO`: runs until it blocks or yields; equal-priority peers
    /// never time-slice it.
    #[default]
    Fifo,
    /// `SCHED_RR`: like FIFO but round-robins among equal priorities.
    RoundRobin,
}

impl RealtimePolicy {
    pub fn as_raw(self) -> libc::c_int {
        match self {
            RealtimePolicy::Fifo => libc::SCHED_FIFO,
            RealtimePolicy::RoundRobin => libc::SCHED_RR,
        }
    }
}

impl fmt::Display for RealtimePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RealtimePolicy::Fifo => write!(f, "SCHED_FIFO"),
            RealtimePolicy::RoundRobin => write!(f, "SCHED_RR"),
        }
    }
}

/// How a failure to raise priority is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElevationMode {
    /// Failure aborts the run.
    #[default]
    Required,
    /// Failure is logged and the run continues under default scheduling.
    BestEffort,
    /// Priority is left untouched.
    Disabled,
}

/// A concrete policy and priority pair that can be applied to a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealtimeParams {
    pub policy: RealtimePolicy,
    pub priority: i32,
}

impl RealtimeParams {
    /// Apply to the calling thread via `pthread_setschedparam`.
    pub fn apply_to_current(&self) -> Result<()> {
        // SAFETY: sched_param is a plain C struct; all-zero is a valid value.
        let mut param: libc::sched_param = unsafe { std::mem::zeroed() };
        param.sched_priority = self.priority;
        // SAFETY: pthread_self() is always a valid handle for the caller and
        // `param` outlives the call.
        let rc = unsafe {
            libc::pthread_setschedparam(libc::pthread_self(), self.policy.as_raw(), &param)
        };
        if rc != 0 {
            return Err(SchedError::Priority {
                op: "set",
                source: io::Error::from_raw_os_error(rc),
            });
        }
        Ok(())
    }
}

/// Raises threads to the highest priority of a real-time policy.
#[derive(Debug, Clone, Copy)]
pub struct SchedulingElevator {
    policy: RealtimePolicy,
    max_priority: i32,
}

impl SchedulingElevator {
    /// Look up the maximum priority for `policy`.
    pub fn new(policy: RealtimePolicy) -> Result<Self> {
        // SAFETY: no pointers involved.
        let max_priority = unsafe { libc::sched_get_priority_max(policy.as_raw()) };
        if max_priority < 0 {
            return Err(SchedError::Priority {
                op: "query",
                source: io::Error::last_os_error(),
            });
        }
        Ok(SchedulingElevator {
            policy,
            max_priority,
        })
    }

    pub fn policy(&self) -> RealtimePolicy {
        self.policy
    }

    pub fn max_priority(&self) -> i32 {
        self.max_priority
    }

    /// The parameters this elevator applies.
    pub fn params(&self) -> RealtimeParams {
        RealtimeParams {
            policy: self.policy,
            priority: self.max_priority,
        }
    }

    /// Raise the calling thread and return the parameters used.
    pub fn elevate_current(&self) -> Result<RealtimeParams> {
        let params = self.params();
        params.apply_to_current()?;
        Ok(params)
    }
}
