use std::error::Error as StdError;
use tracing::error;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
  #[error("failed to connect to {target}")]
  Connect {
    target: String,
    #[source]
    source: mysql_async::Error,
  },

  #[error("schema setup failed while trying to {op}")]
  Schema {
    op: &'static str,
    #[source]
    source: mysql_async::Error,
  },

  #[error("seeding failed while trying to {op}")]
  Seed {
    op: &'static str,
    #[source]
    source: mysql_async::Error,
  },

  #[error("benchmark query failed")]
  Query(#[source] mysql_async::Error),

  #[error("failed to scan benchmark row")]
  Scan(#[source] mysql_async::FromRowError),

  #[error("invalid configuration: {0}")]
  Config(String),

  #[error("dispatch task did not run to completion")]
  Task(#[from] tokio::task::JoinError),
}

impl Error {
  /// Coarse stage the error belongs to, used as the `stage` field of the fatal log line.
  pub fn stage(&self) -> &'static str {
    match self {
      Error::Connect { .. } => "connect",
      Error::Schema { .. } => "schema",
      Error::Seed { .. } => "seed",
      Error::Query(_) => "query",
      Error::Scan(_) => "scan",
      Error::Config(_) => "config",
      Error::Task(_) => "dispatch",
    }
  }
}

pub type Result<T> = std::result::Result<T, Error>;

/// What the drivers do with an error that reaches the top level.
///
/// The benchmarks only measure error-free throughput, so the binaries abort on the first
/// failure. Tests use [`ErrorPolicy::Propagate`] to observe the error instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
  #[default]
  Abort,
  Propagate,
}

impl ErrorPolicy {
  pub fn check<T>(self, result: Result<T>) -> Result<T> {
    let err = match result {
      Ok(value) => return Ok(value),
      Err(err) => err,
    };
    match self {
      ErrorPolicy::Propagate => Err(err),
      ErrorPolicy::Abort => {
        error!(stage = err.stage(), error = %chain(&err), "Fatal error, aborting");
        std::process::exit(1);
      }
    }
  }
}

/// Renders an error and its sources on one line. Driver errors already print their own
/// causes, so the walk stops at the first source whose text is already there.
pub fn chain(err: &(dyn StdError + 'static)) -> String {
  let mut out = err.to_string();
  let mut source = err.source();
  while let Some(cause) = source {
    let text = cause.to_string();
    if out.contains(&text) {
      break;
    }
    out.push_str(": ");
    out.push_str(&text);
    source = cause.source();
  }
  out
}
