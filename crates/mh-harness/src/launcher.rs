use std::thread;

use mh_sched::SpawnAttributes;
use tracing::{debug, warn};

use crate::error::{HarnessError, Result};
use crate::worker::{Worker, WorkerTiming};

/// Runs a batch of workers to completion.
///
/// Implementations must not return until every started worker has finished,
/// and must return timings in the order the workers were given.
pub trait Launcher {
    /// Returns the name of this launcher (e.g., "threads").
    fn name(&self) -> &str;

    fn launch(&self, attrs: &SpawnAttributes, workers: Vec<Worker<'_>>)
        -> Result<Vec<WorkerTiming>>;
}

/// One scoped OS thread per worker.
///
/// Each thread enters the shared spawn attributes, runs its worker, and is
/// joined unconditionally. There is no timeout: a slow worker holds up the
/// whole batch.
#[derive(Debug, Clone, Default)]
pub struct ThreadLauncher;

impl ThreadLauncher {
    pub fn new() -> Self {
        ThreadLauncher
    }
}

impl Launcher for ThreadLauncher {
    fn name(&self) -> &str {
        "threads"
    }

    fn launch(
        &self,
        attrs: &SpawnAttributes,
        workers: Vec<Worker<'_>>,
    ) -> Result<Vec<WorkerTiming>> {
        thread::scope(|s| {
            let mut handles = Vec::with_capacity(workers.len());
            let mut spawn_err = None;

            for worker in workers {
                let index = worker.partition().index;
                let spawned = thread::Builder::new()
                    .name(format!("mh-worker-{}", index))
                    .spawn_scoped(s, move || {
                        // Linux threads inherit the spawning thread's affinity and
                        // scheduling policy, both already applied by the coordinator.
                        if let Err(e) = attrs.enter() {
                            warn!(worker = index, error = %e, "spawn attributes not applied");
                        }
                        worker.run()
                    });
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(source) => {
                        spawn_err = Some(HarnessError::Spawn { index, source });
                        break;
                    }
                }
            }

            debug!(spawned = handles.len(), "workers spawned, joining");
            let mut timings = Vec::with_capacity(handles.len());
            for handle in handles {
                match handle.join() {
                    Ok(timing) => timings.push(timing),
                    Err(payload) => std::panic::resume_unwind(payload),
                }
            }

            match spawn_err {
                Some(e) => Err(e),
                None => Ok(timings),
            }
        })
    }
}

/// Runs every worker in turn on the calling thread.
///
/// Produces the same result matrix as [`ThreadLauncher`]; useful as a
/// baseline and where spawning threads is not wanted.
#[derive(Debug, Clone, Default)]
pub struct InlineLauncher;

impl InlineLauncher {
    pub fn new() -> Self {
        InlineLauncher
    }
}

impl Launcher for InlineLauncher {
    fn name(&self) -> &str {
        "inline"
    }

    fn launch(
        &self,
        _attrs: &SpawnAttributes,
        workers: Vec<Worker<'_>>,
    ) -> Result<Vec<WorkerTiming>> {
        Ok(workers.into_iter().map(Worker::run).collect())
    }
}
