//! Tests against a live MySQL server. Run with `cargo test -- --ignored` and the usual
//! `MYSQL_HOST`, `MYSQL_PORT`, `MYSQL_USER`, `MYSQL_PWD` and `MYSQL_DB` variables.

use std::env;

use constants::*;
use harness::logging::init_test_logging;
use harness::query::{Dob, QueryMode, ScannedUser};
use harness::seed::{count_rows, UserRow};
use harness::{
  seed, ConnectionManager, Dispatcher, Error, MysqlOptions, PoolOptions, UserQuery, Waves,
  WorkerPool,
};
use mysql_async::prelude::Queryable;
use serial_test::serial;

fn mysql_options() -> MysqlOptions {
  MysqlOptions {
    mysql_host: env::var("MYSQL_HOST").unwrap_or_else(|_| "127.0.0.1".into()),
    mysql_port: env::var("MYSQL_PORT")
      .unwrap_or_else(|_| "3306".into())
      .parse()
      .unwrap(),
    mysql_user: env::var("MYSQL_USER").unwrap_or_else(|_| "root".into()),
    mysql_password: env::var("MYSQL_PWD").unwrap_or_else(|_| "root".into()),
    mysql_db: env::var("MYSQL_DB").unwrap_or_else(|_| "bun_bench".into()),
    parse_time: true,
    interpolate_params: true,
  }
}

async fn fresh_manager() -> ConnectionManager {
  init_test_logging();
  let manager = ConnectionManager::connect(&mysql_options(), &PoolOptions::default())
    .await
    .unwrap();
  drop_table(&manager).await;
  manager
}

async fn drop_table(manager: &ConnectionManager) {
  let mut conn = manager.get_conn().await.unwrap();
  conn
    .query_drop(format!("DROP TABLE IF EXISTS {TABLE}"))
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
#[ignore = "requires a running MySQL server"]
async fn seeding_is_idempotent() {
  let manager = fresh_manager().await;

  let first = seed(&manager, SEED_ROWS).await.unwrap();
  assert_eq!(first.existing, 0);
  assert_eq!(first.inserted, SEED_ROWS);

  let second = seed(&manager, SEED_ROWS).await.unwrap();
  assert_eq!(second.existing, SEED_ROWS as u64);
  assert_eq!(second.inserted, 0);

  let mut conn = manager.get_conn().await.unwrap();
  assert_eq!(count_rows(&mut conn).await.unwrap(), SEED_ROWS as u64);
  drop(conn);
  manager.disconnect().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
#[ignore = "requires a running MySQL server"]
async fn seeded_rows_read_back_unchanged() {
  let manager = fresh_manager().await;
  seed(&manager, SEED_ROWS).await.unwrap();

  let mut conn = manager.get_conn().await.unwrap();
  let rows: Vec<mysql_async::Row> = conn
    .query(format!(
      "SELECT id, first_name, last_name, email, dob FROM {TABLE} ORDER BY id"
    ))
    .await
    .unwrap();
  assert_eq!(rows.len(), SEED_ROWS);

  for (i, row) in rows.into_iter().enumerate() {
    let user = ScannedUser::from_row(row, true).unwrap();
    let expected = UserRow::seed(i);
    assert_eq!(user.email, expected.email);
    assert_eq!(user.dob, Dob::Date(expected.dob));
  }
  drop(conn);
  manager.disconnect().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
#[ignore = "requires a running MySQL server"]
async fn query_job_drains_all_rows_in_every_mode() {
  let manager = fresh_manager().await;
  seed(&manager, SEED_ROWS).await.unwrap();

  for (parse_time, interpolate_params) in [(true, true), (true, false), (false, true), (false, false)] {
    let mysql = MysqlOptions {
      parse_time,
      interpolate_params,
      ..mysql_options()
    };
    let job = UserQuery::new(manager.clone(), &mysql, 10);
    assert_eq!(job.execute().await.unwrap(), 10, "{parse_time} {interpolate_params}");
  }
  manager.disconnect().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
#[ignore = "requires a running MySQL server"]
async fn both_strategies_complete_against_the_pool() {
  let manager = fresh_manager().await;
  seed(&manager, SEED_ROWS).await.unwrap();
  let job = || UserQuery::new(manager.clone(), &mysql_options(), ROW_LIMIT);

  let pooled = Dispatcher::new(WorkerPool::new(POOL_WORKERS).unwrap(), 500);
  let prepared = UserQuery::prepared(manager.clone(), &mysql_options(), ROW_LIMIT);
  assert_eq!(pooled.run(prepared).await.unwrap(), 500);

  let waves = Dispatcher::new(Waves::new(WAVE_BATCH_SIZE).unwrap(), 500);
  assert_eq!(waves.run(job()).await.unwrap(), 500);

  manager.disconnect().await.unwrap();
}

async fn stmt_counters(manager: &ConnectionManager) -> (u64, u64) {
  let mut conn = manager.get_conn().await.unwrap();
  let rows: Vec<(String, String)> = conn
    .query("SHOW GLOBAL STATUS WHERE Variable_name IN ('Com_stmt_prepare', 'Com_stmt_execute')")
    .await
    .unwrap();
  let counter = |name: &str| {
    rows
      .iter()
      .find(|(variable, _)| variable.eq_ignore_ascii_case(name))
      .map(|(_, value)| value.parse::<u64>().unwrap())
      .unwrap()
  };
  (counter("Com_stmt_prepare"), counter("Com_stmt_execute"))
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
#[ignore = "requires a running MySQL server"]
async fn worker_pool_job_uses_prepared_statement_with_default_flags() {
  let manager = fresh_manager().await;
  seed(&manager, SEED_ROWS).await.unwrap();

  // Defaults have `interpolate_params` on; the worker pool job must still prepare.
  let mysql = mysql_options();
  assert!(mysql.interpolate_params);
  let job = UserQuery::prepared(manager.clone(), &mysql, ROW_LIMIT);
  assert_eq!(job.mode(), QueryMode::Prepared);
  assert_eq!(UserQuery::new(manager.clone(), &mysql, ROW_LIMIT).mode(), QueryMode::Interpolated);

  let (prepared_before, executed_before) = stmt_counters(&manager).await;
  let dispatcher = Dispatcher::new(WorkerPool::new(4).unwrap(), 200);
  assert_eq!(dispatcher.run(job).await.unwrap(), 200);
  let (prepared_after, executed_after) = stmt_counters(&manager).await;

  assert!(prepared_after > prepared_before, "no COM_STMT_PREPARE was sent");
  assert!(
    executed_after - executed_before >= 200,
    "only {} statement executions",
    executed_after - executed_before
  );
  manager.disconnect().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
#[ignore = "requires a running MySQL server"]
async fn missing_table_fails_dispatch() {
  let manager = fresh_manager().await;
  let job = UserQuery::new(manager.clone(), &mysql_options(), ROW_LIMIT);

  let dispatcher = Dispatcher::new(WorkerPool::new(POOL_WORKERS).unwrap(), 10_000);
  let result = dispatcher.run(job).await;
  assert!(matches!(result, Err(Error::Query(_))), "{result:?}");

  manager.disconnect().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
#[ignore = "requires a running MySQL server"]
async fn unreachable_server_is_a_connect_error() {
  init_test_logging();
  let mysql = MysqlOptions {
    mysql_port: 1,
    ..mysql_options()
  };
  let result = ConnectionManager::connect(&mysql, &PoolOptions::default()).await;
  assert!(matches!(result, Err(Error::Connect { .. })), "{result:?}");
}
