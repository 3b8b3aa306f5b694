use clap::Parser;
use constants::*;
use harness::{
  logging, seed, CommonOptions, ConnectionManager, Dispatcher, ErrorPolicy, Report, ReportFormat,
  Stopwatch, UserQuery, WorkerPool,
};
use tracing::info;

const NAME: &str = "WORKER_POOL";

/// Fixed pool of workers draining a pre-filled, closed job queue.
#[derive(Parser, Debug)]
#[command(name = "worker_pool_bench")]
struct Opts {
  #[command(flatten)]
  common: CommonOptions,

  /// Total number of queries to issue
  #[arg(long, env = "JOBS", default_value_t = POOL_JOBS)]
  jobs: usize,

  /// Number of long-lived workers, i.e. the bound on in-flight queries
  #[arg(long, env = "WORKERS", default_value_t = POOL_WORKERS)]
  workers: usize,
}

fn main() -> anyhow::Result<()> {
  let opts = Opts::parse();
  let policy = ErrorPolicy::Abort;
  // Without a subscriber an aborting policy would exit silently.
  logging::init(&opts.common.logging)?;

  let rt = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
  rt.block_on(run(opts, policy))?;
  Ok(())
}

async fn run(opts: Opts, policy: ErrorPolicy) -> harness::Result<()> {
  let Opts {
    common,
    jobs,
    workers,
  } = opts;

  let strategy = policy.check(WorkerPool::new(workers))?;
  let manager = policy.check(ConnectionManager::connect(&common.mysql, &common.pool).await)?;
  let seeded = policy.check(seed(&manager, common.seed_rows).await)?;
  info!(existing = seeded.existing, inserted = seeded.inserted, "Table ready");

  let dispatcher = Dispatcher::new(strategy, jobs);
  // Every worker runs the same prepared statement, regardless of `--interpolate-params`.
  let job = UserQuery::prepared(manager.clone(), &common.mysql, common.row_limit);

  let stopwatch = Stopwatch::start();
  let completed = policy.check(dispatcher.run(job).await)?;
  policy.check(manager.disconnect().await)?;
  let report = Report::new(stopwatch.stop(), ReportFormat::Duration);

  info!(
    completed,
    workers,
    qps = report.throughput(completed).round(),
    "[{NAME}] Finished"
  );
  println!("{report}");
  Ok(())
}
