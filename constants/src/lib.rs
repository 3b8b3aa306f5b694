use std::time::Duration;

pub const TABLE: &str = "users_bun_bench";

/// Rows the seeder guarantees before any benchmark runs.
pub const SEED_ROWS: usize = 100;

/// Rows returned by a single benchmark query.
pub const ROW_LIMIT: u64 = 100;

// Worker pool variant.
pub const POOL_JOBS: usize = 1_000_000;
pub const POOL_WORKERS: usize = 10;

// Wave variant.
pub const WAVE_QUERIES: usize = 100_000;
pub const WAVE_BATCH_SIZE: usize = 100;

pub const MAX_OPEN_CONNS: usize = 10;
pub const MAX_IDLE_CONNS: usize = 10;
pub const CONN_MAX_LIFETIME: Duration = Duration::from_secs(3 * 60);

pub const CREATE_TABLE_QUERY: &str = r#"
    CREATE TABLE IF NOT EXISTS users_bun_bench (
      id         INT AUTO_INCREMENT PRIMARY KEY,
      first_name VARCHAR(255) NOT NULL,
      last_name  VARCHAR(255) NOT NULL,
      email      VARCHAR(255) NOT NULL UNIQUE,
      dob        DATE NOT NULL
    )
"#;

pub const COUNT_QUERY: &str = "SELECT COUNT(*) FROM users_bun_bench";

pub const INSERT_QUERY: &str =
  "INSERT INTO users_bun_bench (first_name, last_name, email, dob) VALUES (?, ?, ?, ?)";

pub const SELECT_QUERY: &str =
  "SELECT id, first_name, last_name, email, dob FROM users_bun_bench LIMIT ?";

pub const VERSION_QUERY: &str = "SELECT VERSION()";

/// [`SELECT_QUERY`] with the limit rendered client side, for the text protocol.
pub fn select_query_inline(limit: u64) -> String {
  return format!("SELECT id, first_name, last_name, email, dob FROM users_bun_bench LIMIT {limit}");
}
