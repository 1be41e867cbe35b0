use mh_sched::{ElevationMode, RealtimePolicy};

use crate::error::{HarnessError, Result};

/// Parameters of one multiplication run.
///
/// A is `height x width`, B is `width x width2`, the result is
/// `height x width2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub height: usize,
    pub width: usize,
    pub width2: usize,
    pub thread_count: usize,
    /// Cores to bind to; `<= 0` means all online cores.
    pub core_count: i64,
    /// Accept more threads than rows, leaving the surplus workers idle.
    pub allow_idle_workers: bool,
    pub elevation: ElevationMode,
    pub policy: RealtimePolicy,
}

impl RunConfig {
    /// A square-product run (`width2 == height`) on all cores under
    /// required `SCHED_FIFO` elevation.
    pub fn new(height: usize, width: usize, thread_count: usize) -> Self {
        RunConfig {
            height,
            width,
            width2: height,
            thread_count,
            core_count: 0,
            allow_idle_workers: false,
            elevation: ElevationMode::Required,
            policy: RealtimePolicy::Fifo,
        }
    }

    pub fn with_width2(mut self, width2: usize) -> Self {
        self.width2 = width2;
        self
    }

    pub fn with_cores(mut self, core_count: i64) -> Self {
        self.core_count = core_count;
        self
    }

    pub fn allow_idle_workers(mut self, allow: bool) -> Self {
        self.allow_idle_workers = allow;
        self
    }

    pub fn with_elevation(mut self, elevation: ElevationMode) -> Self {
        self.elevation = elevation;
        self
    }

    pub fn with_policy(mut self, policy: RealtimePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Check dimensions and thread count.
    ///
    /// # Errors
    /// `InvalidConfiguration` if any dimension or the thread count is zero,
    /// or if `thread_count > height` without `allow_idle_workers`.
    pub fn validate(&self) -> Result<()> {
        if self.thread_count == 0 || self.height == 0 || self.width == 0 || self.width2 == 0 {
            return Err(HarnessError::InvalidConfiguration(format!(
                "threads, width and height must be > 0 (threads={}, {}x{} @ {}x{})",
                self.thread_count, self.height, self.width, self.width, self.width2
            )));
        }
        if self.thread_count > self.height && !self.allow_idle_workers {
            return Err(HarnessError::InvalidConfiguration(format!(
                "{} threads cannot each get a row of a {}-row matrix",
                self.thread_count, self.height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_defaults() {
        let c = RunConfig::new(8, 4, 2);
        assert_eq!(c.width2, 8);
        assert_eq!(c.core_count, 0);
        assert_eq!(c.elevation, ElevationMode::Required);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        for c in [
            RunConfig::new(0, 4, 1),
            RunConfig::new(4, 0, 1),
            RunConfig::new(4, 4, 0),
            RunConfig::new(4, 4, 1).with_width2(0),
        ] {
            assert_eq!(c.validate().unwrap_err().code(), ErrorCode::Config);
        }
    }

    #[test]
    fn test_threads_above_height() {
        let c = RunConfig::new(2, 4, 3);
        assert!(c.validate().is_err());
        assert!(c.allow_idle_workers(true).validate().is_ok());
    }
}
