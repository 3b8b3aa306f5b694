use crate::error::{Error, Result};
use clap::{ArgAction, Args};
use constants::*;
use mysql_async::{Opts, OptsBuilder, PoolConstraints, PoolOpts};
use std::time::Duration;

/// Options shared by both drivers.
#[derive(Debug, Clone, Args)]
pub struct CommonOptions {
  #[command(flatten)]
  pub mysql: MysqlOptions,

  #[command(flatten)]
  pub pool: PoolOptions,

  #[command(flatten)]
  pub logging: LoggingOptions,

  /// Minimum number of rows the benchmark table must hold before dispatch starts
  #[arg(long, env = "SEED_ROWS", default_value_t = SEED_ROWS)]
  pub seed_rows: usize,

  /// LIMIT of the benchmark SELECT
  #[arg(long, env = "ROW_LIMIT", default_value_t = ROW_LIMIT)]
  pub row_limit: u64,
}

#[derive(Debug, Clone, Args)]
pub struct MysqlOptions {
  #[arg(long, env = "MYSQL_HOST", default_value = "127.0.0.1")]
  pub mysql_host: String,

  #[arg(long, env = "MYSQL_PORT", default_value_t = 3306)]
  pub mysql_port: u16,

  #[arg(long, env = "MYSQL_USER", default_value = "root")]
  pub mysql_user: String,

  #[arg(long, env = "MYSQL_PWD", default_value = "root")]
  pub mysql_password: String,

  #[arg(long, env = "MYSQL_DB", default_value = "bun_bench")]
  pub mysql_db: String,

  /// Decode DATE columns into calendar dates instead of keeping the raw driver value
  #[arg(long, env = "PARSE_TIME", default_value_t = true, action = ArgAction::Set)]
  pub parse_time: bool,

  /// Inline query arguments client side and use the text protocol instead of server-side
  /// prepared statements
  #[arg(long, env = "INTERPOLATE_PARAMS", default_value_t = true, action = ArgAction::Set)]
  pub interpolate_params: bool,
}

impl MysqlOptions {
  /// `host:port/db`, for logs and connection errors. Never includes credentials.
  pub fn target(&self) -> String {
    format!("{}:{}/{}", self.mysql_host, self.mysql_port, self.mysql_db)
  }

  pub fn to_mysql_opts(&self, pool: &PoolOptions) -> Result<Opts> {
    Ok(
      OptsBuilder::default()
        .ip_or_hostname(&self.mysql_host)
        .tcp_port(self.mysql_port)
        .user(Some(&self.mysql_user))
        .pass(Some(&self.mysql_password))
        .db_name(Some(&self.mysql_db))
        .prefer_socket(false)
        .pool_opts(pool.to_pool_opts()?)
        .into(),
    )
  }
}

#[derive(Debug, Clone, Args)]
pub struct PoolOptions {
  /// Upper bound on physical connections
  #[arg(long, default_value_t = MAX_OPEN_CONNS)]
  pub max_open_conns: usize,

  /// Idle connections kept around between queries
  #[arg(long, default_value_t = MAX_IDLE_CONNS)]
  pub max_idle_conns: usize,

  /// Age after which a connection is closed instead of being reused
  #[arg(long, default_value_t = CONN_MAX_LIFETIME.as_secs())]
  pub conn_max_lifetime_secs: u64,
}

impl Default for PoolOptions {
  fn default() -> Self {
    Self {
      max_open_conns: MAX_OPEN_CONNS,
      max_idle_conns: MAX_IDLE_CONNS,
      conn_max_lifetime_secs: CONN_MAX_LIFETIME.as_secs(),
    }
  }
}

impl PoolOptions {
  pub fn conn_max_lifetime(&self) -> Duration {
    Duration::from_secs(self.conn_max_lifetime_secs)
  }

  pub fn to_pool_opts(&self) -> Result<PoolOpts> {
    if self.max_open_conns == 0 {
      return Err(Error::Config("max-open-conns must be at least 1".into()));
    }
    // The driver keeps up to `min` idle connections, so that is where the idle bound goes.
    let constraints = PoolConstraints::new(self.max_idle_conns, self.max_open_conns).ok_or_else(|| {
      Error::Config(format!(
        "max-idle-conns ({}) must not exceed max-open-conns ({})",
        self.max_idle_conns, self.max_open_conns
      ))
    })?;

    Ok(
      PoolOpts::default()
        .with_constraints(constraints)
        .with_abs_conn_ttl(Some(self.conn_max_lifetime())),
    )
  }
}

#[derive(Debug, Clone, Args)]
pub struct LoggingOptions {
  /// Log filter directives, e.g. `info` or `info,harness=trace`
  #[arg(long, env = "LOG_LEVEL", default_value = "info")]
  pub log_level: String,
}
