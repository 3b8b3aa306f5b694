//! Shared pieces of the MySQL throughput benchmarks: pooled connections, table seeding,
//! bounded concurrent dispatch and the elapsed-time report.

pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod query;
pub mod report;
pub mod seed;

pub use config::{CommonOptions, LoggingOptions, MysqlOptions, PoolOptions};
pub use connection::ConnectionManager;
pub use dispatch::{DispatchStrategy, Dispatcher, Job, Waves, WorkerPool};
pub use error::{Error, ErrorPolicy, Result};
pub use query::UserQuery;
pub use report::{Report, ReportFormat, Stopwatch};
pub use seed::{seed, SeedOutcome};
