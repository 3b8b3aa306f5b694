use crate::config::{MysqlOptions, PoolOptions};
use crate::error::{Error, Result};
use constants::VERSION_QUERY;
use mysql_async::prelude::*;
use mysql_async::{Conn, Pool};
use tracing::info;

/// Pooled handle to the benchmark database.
///
/// Cloning is cheap and every clone shares the same pool. The handle is safe to use from any
/// number of tasks at once: the pool hands out at most `max_open_conns` physical connections
/// and queues callers beyond that until a connection is returned.
#[derive(Debug, Clone)]
pub struct ConnectionManager {
  pool: Pool,
  target: String,
}

impl ConnectionManager {
  /// Builds the pool and probes the server once, so connectivity problems surface before any
  /// benchmark work starts.
  pub async fn connect(mysql: &MysqlOptions, pool: &PoolOptions) -> Result<Self> {
    let target = mysql.target();
    info!(
      %target,
      max_open = pool.max_open_conns,
      max_idle = pool.max_idle_conns,
      max_lifetime = ?pool.conn_max_lifetime(),
      "Connecting to MySQL"
    );

    let manager = Self {
      pool: Pool::new(mysql.to_mysql_opts(pool)?),
      target,
    };
    let version = manager.probe().await?;
    info!(%version, "Connected to MySQL");

    Ok(manager)
  }

  async fn probe(&self) -> Result<String> {
    let mut conn = self.get_conn().await.map_err(|err| self.connect_error(err))?;
    conn.ping().await.map_err(|err| self.connect_error(err))?;
    let version: Option<String> = conn
      .query_first(VERSION_QUERY)
      .await
      .map_err(|err| self.connect_error(err))?;
    Ok(version.unwrap_or_default())
  }

  /// Checks a connection out of the pool; it goes back when dropped.
  pub async fn get_conn(&self) -> mysql_async::Result<Conn> {
    self.pool.get_conn().await
  }

  /// Waits for checked-out connections to come back, then closes all of them.
  pub async fn disconnect(self) -> Result<()> {
    let Self { pool, target } = self;
    pool
      .disconnect()
      .await
      .map_err(|source| Error::Connect { target, source })
  }

  fn connect_error(&self, source: mysql_async::Error) -> Error {
    Error::Connect {
      target: self.target.clone(),
      source,
    }
  }
}
