use clap::Parser;
use constants::*;
use harness::{
  logging, seed, CommonOptions, ConnectionManager, Dispatcher, ErrorPolicy, Report, ReportFormat,
  Stopwatch, UserQuery, Waves,
};
use tracing::info;

const NAME: &str = "WAVE";

/// Queries issued in sequential waves with a full barrier between waves.
#[derive(Parser, Debug)]
#[command(name = "wave_bench")]
struct Opts {
  #[command(flatten)]
  common: CommonOptions,

  /// Total number of queries to issue
  #[arg(long, env = "QUERIES", default_value_t = WAVE_QUERIES)]
  queries: usize,

  /// Queries per wave, i.e. the bound on in-flight queries
  #[arg(long, env = "BATCH_SIZE", default_value_t = WAVE_BATCH_SIZE)]
  batch_size: usize,
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
    queries,
    batch_size,
  } = opts;

  let strategy = policy.check(Waves::new(batch_size))?;
  let manager = policy.check(ConnectionManager::connect(&common.mysql, &common.pool).await)?;
  let seeded = policy.check(seed(&manager, common.seed_rows).await)?;
  info!(existing = seeded.existing, inserted = seeded.inserted, "Table ready");

  let dispatcher = Dispatcher::new(strategy, queries);
  let job = UserQuery::new(manager.clone(), &common.mysql, common.row_limit);

  let stopwatch = Stopwatch::start();
  let completed = policy.check(dispatcher.run(job).await)?;
  let report = Report::new(stopwatch.stop(), ReportFormat::Millis);

  info!(
    completed,
    waves = completed.div_ceil(batch_size),
    qps = report.throughput(completed).round(),
    "[{NAME}] Finished"
  );
  println!("{report}");

  policy.check(manager.disconnect().await)?;
  Ok(())
}
