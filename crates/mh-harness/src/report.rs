use std::fmt;
use std::time::Duration;

use crate::config::RunConfig;
use crate::worker::{millis, WorkerTiming};

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub height: usize,
    pub width: usize,
    pub width2: usize,
    pub thread_count: usize,
    /// Cores in the affinity mask.
    pub cores: usize,
    /// Mean of each worker's own start-to-end time.
    pub average_worker_time_ms: f64,
    /// Wall-clock time from before the first spawn to after the last join.
    pub total_time_ms: f64,
}

impl Report {
    pub fn aggregate(
        config: &RunConfig,
        cores: usize,
        timings: &[WorkerTiming],
        total: Duration,
    ) -> Self {
        let average_worker_time_ms = if timings.is_empty() {
            0.0
        } else {
            timings.iter().map(WorkerTiming::elapsed_ms).sum::<f64>() / timings.len() as f64
        };
        Report {
            height: config.height,
            width: config.width,
            width2: config.width2,
            thread_count: config.thread_count,
            cores,
            average_worker_time_ms,
            total_time_ms: millis(total),
        }
    }

    /// Number of elements in the result matrix.
    pub fn element_count(&self) -> usize {
        self.height * self.width2
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Height: {}", self.height)?;
        writeln!(f, "Width: {}", self.width)?;
        writeln!(f, "Threads: {}", self.thread_count)?;
        writeln!(f)?;
        writeln!(
            f,
            "Average thread time, ms: {}",
            general(self.average_worker_time_ms)
        )?;
        write!(f, "Calculation took, ms: {}", general(self.total_time_ms))
    }
}

/// Significant digits shown for timings.
const PRECISION: i32 = 6;

/// Format like C's `%g`: six significant digits, trailing zeros dropped,
/// scientific notation below 1e-4 and from 1e6 up.
fn general(v: f64) -> String {
    if v == 0.0 || !v.is_finite() {
        return v.to_string();
    }
    let sci = format!("{:.*e}", (PRECISION - 1) as usize, v);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => return sci,
    };
    if exp < -4 || exp >= PRECISION {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_zeros(mantissa), sign, exp.abs())
    } else {
        let decimals = (PRECISION - 1 - exp) as usize;
        trim_zeros(&format!("{:.*}", decimals, v)).to_string()
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
