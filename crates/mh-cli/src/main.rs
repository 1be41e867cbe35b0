use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use mh_harness::{
    Coordinator, DeviceSeed, FixedSeed, Report, Result, RunConfig, SeedSource,
    DEFAULT_ENTROPY_PATH,
};
use mh_sched::{ElevationMode, RealtimePolicy};
use tracing::Level;

/// Exit status for a bad command line (sysexits `EX_USAGE`), kept apart from
/// the run failure codes 1 to 6.
const EX_USAGE: u8 = 64;

#[derive(Parser, Debug)]
#[command(
    name = "matrix-harness",
    version,
    about = "Calculate the time it takes to multiply 2 matrices H*W and W*H filled with random numbers",
    arg_required_else_help = true
)]
struct Cli {
    /// Number of worker threads
    #[arg(short = 't', long = "threads")]
    threads: usize,

    /// Number of cores the workers may run on (0 or less: all online cores)
    #[arg(short = 'c', long = "cores", default_value_t = 0, allow_negative_numbers = true)]
    cores: i64,

    /// Columns of A and rows of B
    #[arg(short = 'W', long)]
    width: usize,

    /// Rows of A
    #[arg(short = 'H', long)]
    height: usize,

    /// Columns of B (default: same as height)
    #[arg(long)]
    width2: Option<usize>,

    /// Log setup and per-worker progress to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Use a fixed seed instead of reading the entropy device
    #[arg(long, conflicts_with = "entropy")]
    seed: Option<u64>,

    /// Entropy device to read the seed from
    #[arg(long, default_value = DEFAULT_ENTROPY_PATH)]
    entropy: PathBuf,

    /// Allow more threads than rows; surplus workers get no rows
    #[arg(long)]
    allow_idle_workers: bool,

    /// How to treat real-time priority elevation
    #[arg(long, value_enum, default_value_t = RealtimeArg::Required)]
    realtime: RealtimeArg,

    /// Real-time scheduling policy
    #[arg(long, value_enum, default_value_t = PolicyArg::Fifo)]
    policy: PolicyArg,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum RealtimeArg {
    /// Abort if priority cannot be raised
    Required,
    /// Warn and continue under default scheduling
    BestEffort,
    /// Do not touch priority
    Off,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum PolicyArg {
    Fifo,
    Rr,
}

impl Cli {
    fn to_config(&self) -> RunConfig {
        let elevation = match self.realtime {
            RealtimeArg::Required => ElevationMode::Required,
            RealtimeArg::BestEffort => ElevationMode::BestEffort,
            RealtimeArg::Off => ElevationMode::Disabled,
        };
        let policy = match self.policy {
            PolicyArg::Fifo => RealtimePolicy::Fifo,
            PolicyArg::Rr => RealtimePolicy::RoundRobin,
        };
        RunConfig::new(self.height, self.width, self.threads)
            .with_width2(self.width2.unwrap_or(self.height))
            .with_cores(self.cores)
            .allow_idle_workers(self.allow_idle_workers)
            .with_elevation(elevation)
            .with_policy(policy)
    }

    fn seed_source(&self) -> Box<dyn SeedSource> {
        match self.seed {
            Some(seed) => Box::new(FixedSeed(seed)),
            None => Box::new(DeviceSeed::new(&self.entropy)),
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// Exit status after clap declined to parse: 0 for `--help`/`--version`,
/// `EX_USAGE` for anything printed to stderr.
fn usage_status(e: &clap::Error) -> u8 {
    if e.use_stderr() {
        EX_USAGE
    } else {
        0
    }
}

fn run(cli: &Cli) -> Result<Report> {
    let coordinator = Coordinator::new(cli.to_config());
    let mut seeds = cli.seed_source();
    coordinator.run_report(seeds.as_mut())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(usage_status(&e));
        }
    };
    init_tracing(cli.verbose);
    tracing::debug!(?cli, "parsed arguments");

    match run(&cli) {
        Ok(report) => {
            println!("{}", report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            let code = e.code();
            eprintln!("Error: {}", code.message());
            eprintln!("  {}", e);
            ExitCode::from(code.exit_status() as u8)
        }
    }
}
