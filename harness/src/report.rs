use std::fmt;
use std::time::{Duration, Instant};

/// Monotonic wall-clock timer around the dispatch phase.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
  start: Instant,
}

impl Stopwatch {
  pub fn start() -> Self {
    Self {
      start: Instant::now(),
    }
  }

  pub fn stop(self) -> Duration {
    Instant::now() - self.start
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
  /// `Debug` rendering of the duration, e.g. `1.5s`.
  Duration,
  /// Milliseconds with two decimals.
  Millis,
}

/// The single line a benchmark prints to stdout.
#[derive(Debug, Clone, Copy)]
pub struct Report {
  pub elapsed: Duration,
  pub format: ReportFormat,
}

impl Report {
  pub fn new(elapsed: Duration, format: ReportFormat) -> Self {
    Self { elapsed, format }
  }

  /// Completed jobs per second over the measured interval.
  pub fn throughput(&self, completed: usize) -> f64 {
    let secs = self.elapsed.as_secs_f64();
    if secs == 0.0 {
      return 0.0;
    }
    completed as f64 / secs
  }
}

impl fmt::Display for Report {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.format {
      ReportFormat::Duration => write!(f, "Total time: {:?}", self.elapsed),
      ReportFormat::Millis => write!(
        f,
        "Total time: {:.2} ms",
        self.elapsed.as_secs_f64() * 1000.0
      ),
    }
  }
}
