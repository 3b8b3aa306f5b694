//! Bounded concurrent dispatch of benchmark jobs.
//!
//! Two strategies bound how many jobs run at once:
//!
//! * [`WorkerPool`]: a fixed set of long-lived workers pulling tokens from a shared queue that is
//!   filled up front and then closed. Workers exit once the queue is closed and drained.
//! * [`Waves`]: jobs are started in waves of `batch_size` tasks and every wave must finish
//!   before the next one is started.
//!
//! Both fail fast: the first job error cancels every task still running and is returned to the
//! caller, no further tokens or waves are started.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, info, trace};

/// One unit of benchmark work, e.g. issue a query and drain its result set.
#[async_trait]
pub trait Job: Send + Sync + 'static {
  /// `index` is the position of the token in `0..total`.
  async fn run(&self, index: usize) -> Result<()>;
}

#[async_trait]
pub trait DispatchStrategy: Send + Sync {
  fn name(&self) -> &'static str;

  /// Upper bound on concurrently running jobs.
  fn max_in_flight(&self) -> usize;

  /// Runs `job` for every index in `0..total` and returns how many runs completed.
  async fn dispatch<J: Job>(&self, total: usize, job: Arc<J>) -> Result<usize>;
}

#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
  workers: NonZeroUsize,
}

impl WorkerPool {
  pub fn new(workers: usize) -> Result<Self> {
    let workers = NonZeroUsize::new(workers)
      .ok_or_else(|| Error::Config("worker count must be at least 1".into()))?;
    Ok(Self { workers })
  }
}

#[async_trait]
impl DispatchStrategy for WorkerPool {
  fn name(&self) -> &'static str {
    "worker-pool"
  }

  fn max_in_flight(&self) -> usize {
    self.workers.get()
  }

  async fn dispatch<J: Job>(&self, total: usize, job: Arc<J>) -> Result<usize> {
    let (tx, rx) = mpsc::unbounded_channel::<usize>();
    for index in 0..total {
      // The receiver is alive until the workers below are done.
      let _ = tx.send(index);
    }
    // Closing the queue is the only termination signal the workers get.
    drop(tx);

    let queue = Arc::new(Mutex::new(rx));
    let mut workers = JoinSet::new();
    for worker in 0..self.workers.get() {
      let queue = queue.clone();
      let job = job.clone();

      workers.spawn(async move {
        let mut done = 0;
        loop {
          let next = queue.lock().await.recv().await;
          let Some(index) = next else {
            break;
          };
          job.run(index).await?;
          done += 1;
        }
        trace!(worker, done, "Worker drained queue");
        Ok(done)
      });
    }

    join_all(workers).await
  }
}

#[derive(Debug, Clone, Copy)]
pub struct Waves {
  batch_size: NonZeroUsize,
}

impl Waves {
  pub fn new(batch_size: usize) -> Result<Self> {
    let batch_size = NonZeroUsize::new(batch_size)
      .ok_or_else(|| Error::Config("batch size must be at least 1".into()))?;
    Ok(Self { batch_size })
  }
}

#[async_trait]
impl DispatchStrategy for Waves {
  fn name(&self) -> &'static str {
    "waves"
  }

  fn max_in_flight(&self) -> usize {
    self.batch_size.get()
  }

  async fn dispatch<J: Job>(&self, total: usize, job: Arc<J>) -> Result<usize> {
    let mut completed = 0;
    let mut start = 0;
    let mut wave = 0;

    while start < total {
      let end = total.min(start + self.batch_size.get());
      let mut tasks = JoinSet::new();
      for index in start..end {
        let job = job.clone();
        tasks.spawn(async move { job.run(index).await.map(|()| 1) });
      }

      // Barrier: nothing from the next wave starts until this one is fully done.
      completed += join_all(tasks).await?;
      trace!(wave, completed, "Wave complete");

      start = end;
      wave += 1;
    }

    Ok(completed)
  }
}

/// Sums the completions of `tasks`. On the first failure the remaining tasks are aborted and
/// the error is returned.
async fn join_all(mut tasks: JoinSet<Result<usize>>) -> Result<usize> {
  let mut completed = 0;
  while let Some(joined) = tasks.join_next().await {
    match joined.map_err(Error::from).and_then(|result| result) {
      Ok(done) => completed += done,
      Err(err) => {
        tasks.abort_all();
        return Err(err);
      }
    }
  }
  Ok(completed)
}

/// A strategy paired with the number of jobs to run.
#[derive(Debug)]
pub struct Dispatcher<S> {
  strategy: S,
  total: usize,
}

impl<S: DispatchStrategy> Dispatcher<S> {
  pub fn new(strategy: S, total: usize) -> Self {
    Self { strategy, total }
  }

  pub fn total(&self) -> usize {
    self.total
  }

  pub fn strategy(&self) -> &S {
    &self.strategy
  }

  pub async fn run<J: Job>(&self, job: J) -> Result<usize> {
    info!(
      strategy = self.strategy.name(),
      total = self.total,
      max_in_flight = self.strategy.max_in_flight(),
      "Dispatching jobs"
    );
    let completed = self.strategy.dispatch(self.total, Arc::new(job)).await?;
    debug!(completed, "Dispatch finished");
    Ok(completed)
  }
}
