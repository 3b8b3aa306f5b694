use crate::connection::ConnectionManager;
use crate::error::{Error, Result};
use chrono::NaiveDate;
use constants::*;
use mysql_async::prelude::*;
use mysql_async::{Conn, Params, TxOpts};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
  pub first_name: String,
  pub last_name: String,
  pub email: String,
  pub dob: NaiveDate,
}

impl UserRow {
  /// Deterministic row for seed index `i`.
  pub fn seed(i: usize) -> Self {
    let year = 1970 + (i % 30) as i32;
    let month = 1 + (i % 12) as u32;
    // Days stop at 28 so every month is valid.
    let day = 1 + (i % 28) as u32;

    Self {
      first_name: format!("FirstName{i}"),
      last_name: format!("LastName{i}"),
      email: format!("user{i}@example.com"),
      dob: NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN),
    }
  }

  fn params(&self) -> Params {
    Params::Positional(vec![
      self.first_name.as_str().into(),
      self.last_name.as_str().into(),
      self.email.as_str().into(),
      self.dob.into(),
    ])
  }
}

pub fn seed_rows(n: usize) -> Vec<UserRow> {
  (0..n).map(UserRow::seed).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedOutcome {
  /// Rows found before seeding.
  pub existing: u64,
  pub inserted: usize,
}

pub async fn ensure_schema(conn: &mut Conn) -> Result<()> {
  conn
    .query_drop(CREATE_TABLE_QUERY)
    .await
    .map_err(|source| Error::Schema {
      op: "create table",
      source,
    })
}

pub async fn count_rows(conn: &mut Conn) -> Result<u64> {
  let count: Option<u64> = conn
    .query_first(COUNT_QUERY)
    .await
    .map_err(|source| Error::Schema {
      op: "count rows",
      source,
    })?;
  Ok(count.unwrap_or(0))
}

/// Makes sure the benchmark table exists and holds at least `threshold` rows.
///
/// A table that already has enough rows is left untouched. Otherwise exactly `threshold` rows
/// are inserted in a single transaction through one prepared statement.
pub async fn seed(manager: &ConnectionManager, threshold: usize) -> Result<SeedOutcome> {
  let mut conn = manager
    .get_conn()
    .await
    .map_err(|source| Error::Schema {
      op: "acquire connection",
      source,
    })?;

  ensure_schema(&mut conn).await?;
  let existing = count_rows(&mut conn).await?;
  if existing >= threshold as u64 {
    debug!(existing, threshold, "Table already seeded");
    return Ok(SeedOutcome {
      existing,
      inserted: 0,
    });
  }

  let rows = seed_rows(threshold);
  insert_rows(&mut conn, &rows).await?;
  info!(existing, inserted = rows.len(), "Seeded {TABLE}");

  Ok(SeedOutcome {
    existing,
    inserted: rows.len(),
  })
}

fn seed_error(op: &'static str) -> impl FnOnce(mysql_async::Error) -> Error {
  move |source| Error::Seed { op, source }
}

async fn insert_rows(conn: &mut Conn, rows: &[UserRow]) -> Result<()> {
  let mut tx = conn
    .start_transaction(TxOpts::default())
    .await
    .map_err(seed_error("begin transaction"))?;
  let stmt = tx
    .prep(INSERT_QUERY)
    .await
    .map_err(seed_error("prepare insert"))?;
  tx.exec_batch(&stmt, rows.iter().map(UserRow::params))
    .await
    .map_err(seed_error("insert rows"))?;
  tx.commit().await.map_err(seed_error("commit"))
}
