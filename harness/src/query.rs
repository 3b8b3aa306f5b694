use crate::config::MysqlOptions;
use crate::connection::ConnectionManager;
use crate::dispatch::Job;
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use constants::{select_query_inline, SELECT_QUERY};
use mysql_async::prelude::*;
use mysql_async::{from_row_opt, QueryResult, Row, Value};
use std::hint::black_box;

#[derive(Debug, Clone, PartialEq)]
pub enum Dob {
  Date(NaiveDate),
  /// Raw driver value, kept when time parsing is off.
  Raw(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScannedUser {
  pub id: u64,
  pub first_name: String,
  pub last_name: String,
  pub email: String,
  pub dob: Dob,
}

impl ScannedUser {
  pub fn from_row(row: Row, parse_time: bool) -> Result<Self> {
    if parse_time {
      let (id, first_name, last_name, email, dob) =
        from_row_opt::<(u64, String, String, String, NaiveDate)>(row).map_err(Error::Scan)?;
      Ok(Self {
        id,
        first_name,
        last_name,
        email,
        dob: Dob::Date(dob),
      })
    } else {
      let (id, first_name, last_name, email, dob) =
        from_row_opt::<(u64, String, String, String, Value)>(row).map_err(Error::Scan)?;
      Ok(Self {
        id,
        first_name,
        last_name,
        email,
        dob: Dob::Raw(dob),
      })
    }
  }
}

/// How [`UserQuery`] sends its `SELECT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
  /// Server-side prepared statement with the limit bound as a parameter. The driver's statement
  /// cache prepares it once per physical connection and every caller reuses it.
  Prepared,
  /// Limit rendered into the SQL client side, sent over the text protocol.
  Interpolated,
}

impl QueryMode {
  pub fn from_interpolate_params(interpolate_params: bool) -> Self {
    if interpolate_params {
      QueryMode::Interpolated
    } else {
      QueryMode::Prepared
    }
  }
}

/// The benchmark job: one `SELECT ... LIMIT n` against the seeded table, every row scanned
/// and then discarded.
#[derive(Debug, Clone)]
pub struct UserQuery {
  manager: ConnectionManager,
  row_limit: u64,
  parse_time: bool,
  mode: QueryMode,
  inline_sql: String,
}

impl UserQuery {
  /// Ad-hoc query; `interpolate_params` picks the protocol.
  pub fn new(manager: ConnectionManager, mysql: &MysqlOptions, row_limit: u64) -> Self {
    let mode = QueryMode::from_interpolate_params(mysql.interpolate_params);
    Self::with_mode(manager, mysql, row_limit, mode)
  }

  /// Always a prepared statement, whatever `interpolate_params` says.
  pub fn prepared(manager: ConnectionManager, mysql: &MysqlOptions, row_limit: u64) -> Self {
    Self::with_mode(manager, mysql, row_limit, QueryMode::Prepared)
  }

  fn with_mode(
    manager: ConnectionManager,
    mysql: &MysqlOptions,
    row_limit: u64,
    mode: QueryMode,
  ) -> Self {
    Self {
      manager,
      row_limit,
      parse_time: mysql.parse_time,
      mode,
      inline_sql: select_query_inline(row_limit),
    }
  }

  pub fn mode(&self) -> QueryMode {
    self.mode
  }

  /// Issues the query once and returns the number of rows scanned.
  pub async fn execute(&self) -> Result<usize> {
    let mut conn = self.manager.get_conn().await.map_err(Error::Query)?;
    match self.mode {
      QueryMode::Interpolated => {
        let result = conn
          .query_iter(self.inline_sql.as_str())
          .await
          .map_err(Error::Query)?;
        drain(result, self.parse_time).await
      }
      QueryMode::Prepared => {
        let result = conn
          .exec_iter(SELECT_QUERY, (self.row_limit,))
          .await
          .map_err(Error::Query)?;
        drain(result, self.parse_time).await
      }
    }
  }
}

#[async_trait]
impl Job for UserQuery {
  async fn run(&self, _index: usize) -> Result<()> {
    self.execute().await.map(|_| ())
  }
}

/// Consumes every row of every result set. The connection is not reusable until this is done.
async fn drain<P>(mut result: QueryResult<'_, 'static, P>, parse_time: bool) -> Result<usize>
where
  P: Protocol + Unpin,
{
  let mut scanned = 0;
  let mut failure = None;
  result
    .for_each(|row| {
      if failure.is_some() {
        return;
      }
      match ScannedUser::from_row(row, parse_time) {
        Ok(user) => {
          black_box(user);
          scanned += 1;
        }
        Err(err) => failure = Some(err),
      }
    })
    .await
    .map_err(Error::Query)?;

  match failure {
    Some(err) => Err(err),
    None => Ok(scanned),
  }
}
