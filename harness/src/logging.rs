use crate::config::LoggingOptions;
use crate::error::{Error, Result};
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Events go to stderr; stdout is reserved for the report.
pub fn init(options: &LoggingOptions) -> Result<()> {
  let filter = EnvFilter::try_new(&options.log_level)
    .map_err(|err| Error::Config(format!("invalid log level {:?}: {err}", options.log_level)))?;

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_ansi(std::io::stderr().is_terminal())
    .try_init()
    .map_err(|err| Error::Config(format!("failed to install logger: {err}")))
}

pub fn init_test_logging() {
  // Fails if another test already installed a subscriber, which is fine.
  let _ = tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_env("LOG_LEVEL"))
    .with_test_writer()
    .try_init();
}
