use std::time::Instant;

use mh_matrix::{Matrix, Partitioner, RemainderPolicy};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::entropy::SeedSource;
use crate::error::Result;
use crate::launcher::{Launcher, ThreadLauncher};
use crate::placement::{OsPlacement, Placement};
use crate::report::Report;
use crate::worker::{build_workers, WorkerTiming};

/// Everything a finished run produced.
#[derive(Debug)]
pub struct Outcome {
    pub report: Report,
    pub a: Matrix,
    pub b: Matrix,
    pub result: Matrix,
    pub timings: Vec<WorkerTiming>,
}

/// Sets up, runs, joins and times one parallel multiplication.
///
/// All fallible setup (config, seed, allocation, partitioning, affinity and
/// priority) happens before the launcher is called. A setup failure returns
/// without starting any worker.
#[derive(Debug)]
pub struct Coordinator<L = ThreadLauncher, P = OsPlacement> {
    config: RunConfig,
    partitioner: Partitioner,
    launcher: L,
    placement: P,
}

impl Coordinator<ThreadLauncher> {
    pub fn new(config: RunConfig) -> Self {
        let partitioner =
            Partitioner::new(RemainderPolicy::Last).allow_empty(config.allow_idle_workers);
        Coordinator {
            config,
            partitioner,
            launcher: ThreadLauncher::new(),
            placement: OsPlacement::new(),
        }
    }
}

impl<L: Launcher, P: Placement> Coordinator<L, P> {
    /// Replace the launcher, keeping the configuration.
    pub fn with_launcher<M: Launcher>(self, launcher: M) -> Coordinator<M, P> {
        Coordinator {
            config: self.config,
            partitioner: self.partitioner,
            launcher,
            placement: self.placement,
        }
    }

    /// Replace how spawn attributes are prepared, keeping the configuration.
    pub fn with_placement<Q: Placement>(self, placement: Q) -> Coordinator<L, Q> {
        Coordinator {
            config: self.config,
            partitioner: self.partitioner,
            launcher: self.launcher,
            placement,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    pub fn placement(&self) -> &P {
        &self.placement
    }

    /// Run the multiplication and keep the operands and result.
    pub fn run(&self, seeds: &mut dyn SeedSource) -> Result<Outcome> {
        let cfg = &self.config;
        cfg.validate()?;

        let seed = seeds.seed()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let a = Matrix::random(cfg.height, cfg.width, &mut rng)?;
        let b = Matrix::random(cfg.width, cfg.width2, &mut rng)?;
        let mut result = Matrix::zeros(cfg.height, cfg.width2)?;
        debug!(seed, "operands generated");

        let partitions = self.partitioner.partition(cfg.height, cfg.thread_count)?;

        let attrs = self.placement.prepare(cfg)?;
        let cores = attrs.mask().len();

        info!(
            height = cfg.height,
            width = cfg.width,
            width2 = cfg.width2,
            threads = cfg.thread_count,
            cores,
            seed,
            launcher = self.launcher.name(),
            "starting multiplication"
        );

        let workers = build_workers(&partitions, &a, &b, &mut result)?;
        let started = Instant::now();
        let timings = self.launcher.launch(&attrs, workers)?;
        let total = started.elapsed();

        let report = Report::aggregate(cfg, cores, &timings, total);
        info!(
            avg_ms = report.average_worker_time_ms,
            total_ms = report.total_time_ms,
            "multiplication finished"
        );

        Ok(Outcome {
            report,
            a,
            b,
            result,
            timings,
        })
    }

    /// Run the multiplication and return only the report.
    pub fn run_report(&self, seeds: &mut dyn SeedSource) -> Result<Report> {
        self.run(seeds).map(|o| o.report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::{DeviceSeed, FixedSeed};
    use crate::error::{ErrorCode, HarnessError};
    use crate::launcher::InlineLauncher;
    use crate::worker::Worker;
    use mh_matrix::{MatmulBackend, SequentialBackend};
    use mh_sched::{CoreAffinityMask, ElevationMode, SchedError, SpawnAttributes};
    use std::cell::Cell;
    use std::io;

    /// Counts launches and runs nothing.
    #[derive(Default)]
    struct SpyLauncher {
        launches: Cell<usize>,
        workers: Cell<usize>,
    }

    impl Launcher for SpyLauncher {
        fn name(&self) -> &str {
            "spy"
        }

        fn launch(
            &self,
            _attrs: &SpawnAttributes,
            workers: Vec<Worker<'_>>,
        ) -> Result<Vec<WorkerTiming>> {
            self.launches.set(self.launches.get() + 1);
            self.workers.set(self.workers.get() + workers.len());
            Ok(workers.into_iter().map(Worker::run).collect())
        }
    }

    /// Refuses to place workers, as an unprivileged process would.
    struct DeniedPlacement {
        calls: Cell<usize>,
        no_cores: bool,
    }

    impl DeniedPlacement {
        fn new(no_cores: bool) -> Self {
            DeniedPlacement {
                calls: Cell::new(0),
                no_cores,
            }
        }
    }

    impl Placement for DeniedPlacement {
        fn prepare(&self, _config: &RunConfig) -> mh_sched::Result<SpawnAttributes> {
            self.calls.set(self.calls.get() + 1);
            if self.no_cores {
                return Err(SchedError::NoCores);
            }
            Err(SchedError::Priority {
                op: "set",
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            })
        }
    }

    /// Places workers on a fixed mask without touching the calling thread.
    struct FixedPlacement(usize);

    impl Placement for FixedPlacement {
        fn prepare(&self, _config: &RunConfig) -> mh_sched::Result<SpawnAttributes> {
            CoreAffinityMask::compute(self.0 as i64, 64).map(SpawnAttributes::with_mask)
        }
    }

    struct BrokenDevice;

    impl SeedSource for BrokenDevice {
        fn seed(&mut self) -> Result<u64> {
            Err(HarnessError::EntropyReadFailed {
                path: "/dev/broken".into(),
                source: io::Error::from(io::ErrorKind::Interrupted),
            })
        }
    }

    fn config(height: usize, width: usize, threads: usize) -> RunConfig {
        RunConfig::new(height, width, threads).with_elevation(ElevationMode::Disabled)
    }

    fn on_scratch_thread<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
        std::thread::spawn(f).join().unwrap()
    }

    #[test]
    fn test_small_product_matches_sequential() {
        let outcomes = on_scratch_thread(|| {
            (1..=3)
                .map(|t| Coordinator::new(config(3, 2, t)).run(&mut FixedSeed(7)).unwrap())
                .collect::<Vec<_>>()
        });
        for o in &outcomes {
            let expected = SequentialBackend::new().matmul(&o.a, &o.b).unwrap();
            assert_eq!(o.result, expected);
            assert_eq!(o.result.height(), 3);
            assert_eq!(o.result.width(), 3);
        }
        assert_eq!(outcomes[0].a, outcomes[2].a);
    }

    #[test]
    fn test_threaded_and_inline_agree() {
        let (par, seq) = on_scratch_thread(|| {
            let cfg = config(41, 9, 4).with_width2(17);
            let par = Coordinator::new(cfg.clone()).run(&mut FixedSeed(1234)).unwrap();
            let seq = Coordinator::new(cfg)
                .with_launcher(InlineLauncher::new())
                .run(&mut FixedSeed(1234))
                .unwrap();
            (par, seq)
        });
        assert_eq!(par.result, seq.result);
        assert_eq!(par.timings.len(), 4);
        assert_eq!(par.timings[3].row_count, 11);
    }

    #[test]
    fn test_entropy_failure_spawns_nothing() {
        let coord = Coordinator::new(config(8, 8, 2)).with_launcher(SpyLauncher::default());
        let err = coord.run(&mut BrokenDevice).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Fread);
        assert_eq!(coord.launcher().launches.get(), 0);
    }

    #[test]
    fn test_missing_device_spawns_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let coord = Coordinator::new(config(8, 8, 2)).with_launcher(SpyLauncher::default());
        let err = coord
            .run(&mut DeviceSeed::new(dir.path().join("random")))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Fopen);
        assert_eq!(coord.launcher().launches.get(), 0);
    }

    #[test]
    fn test_invalid_config_spawns_nothing() {
        let coord = Coordinator::new(config(2, 8, 3)).with_launcher(SpyLauncher::default());
        let err = coord.run(&mut FixedSeed(1)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Config);
        assert_eq!(coord.launcher().launches.get(), 0);
    }

    #[test]
    fn test_allocation_failure_spawns_nothing() {
        let coord = Coordinator::new(config(usize::MAX / 2, 4, 1))
            .with_launcher(SpyLauncher::default());
        let err = coord.run(&mut FixedSeed(1)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Alloc);
        assert_eq!(coord.launcher().launches.get(), 0);
    }

    #[test]
    fn test_priority_denied_spawns_nothing() {
        let coord = Coordinator::new(config(8, 8, 2))
            .with_launcher(SpyLauncher::default())
            .with_placement(DeniedPlacement::new(false));
        let err = coord.run(&mut FixedSeed(1)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Cpuset);
        assert!(matches!(
            err,
            HarnessError::AffinityOrSchedulingFailed(SchedError::Priority { .. })
        ));
        assert_eq!(coord.placement().calls.get(), 1);
        assert_eq!(coord.launcher().launches.get(), 0);
    }

    #[test]
    fn test_affinity_failure_spawns_nothing() {
        let coord = Coordinator::new(config(8, 8, 2))
            .with_launcher(SpyLauncher::default())
            .with_placement(DeniedPlacement::new(true));
        let err = coord.run(&mut FixedSeed(1)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Cpuset);
        assert_eq!(coord.launcher().launches.get(), 0);
    }

    #[test]
    fn test_placement_not_called_after_config_failure() {
        let coord = Coordinator::new(config(2, 8, 3))
            .with_launcher(SpyLauncher::default())
            .with_placement(DeniedPlacement::new(false));
        let err = coord.run(&mut FixedSeed(1)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Config);
        assert_eq!(coord.placement().calls.get(), 0);
    }

    #[test]
    fn test_reported_cores_come_from_placement() {
        let report = Coordinator::new(config(6, 2, 2))
            .with_launcher(InlineLauncher::new())
            .with_placement(FixedPlacement(3))
            .run_report(&mut FixedSeed(5))
            .unwrap();
        assert_eq!(report.cores, 3);
    }

    #[test]
    fn test_one_launch_one_worker_per_thread() {
        let coord = Coordinator::new(config(10, 3, 3)).with_launcher(SpyLauncher::default());
        let outcome = on_scratch_thread(move || {
            let o = coord.run(&mut FixedSeed(3)).map(|o| o.report);
            (o, coord.launcher().launches.get(), coord.launcher().workers.get())
        });
        let (report, launches, workers) = outcome;
        assert!(report.is_ok());
        assert_eq!(launches, 1);
        assert_eq!(workers, 3);
    }

    #[test]
    fn test_idle_workers_tolerated() {
        let o = on_scratch_thread(|| {
            Coordinator::new(config(2, 3, 5).allow_idle_workers(true))
                .run(&mut FixedSeed(9))
                .unwrap()
        });
        let rows: Vec<usize> = o.timings.iter().map(|t| t.row_count).collect();
        assert_eq!(rows, vec![0, 0, 0, 0, 2]);
        let expected = SequentialBackend::new().matmul(&o.a, &o.b).unwrap();
        assert_eq!(o.result, expected);
    }

    #[test]
    fn test_report_fields() {
        let report = on_scratch_thread(|| {
            Coordinator::new(config(16, 5, 2).with_cores(-1))
                .run_report(&mut FixedSeed(11))
                .unwrap()
        });
        assert_eq!(report.height, 16);
        assert_eq!(report.width, 5);
        assert_eq!(report.width2, 16);
        assert_eq!(report.thread_count, 2);
        assert_eq!(report.cores, mh_sched::online_cores());
        assert!(report.total_time_ms >= 0.0);
        assert!(report.average_worker_time_ms >= 0.0);
    }
}
