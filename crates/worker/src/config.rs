use std::str::FromStr;
use std::time::Duration;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}', expected 'text' or 'json'")),
        }
    }
}

/// Worker configuration loaded from environment variables.
///
/// All fields except the database URL have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub database_url: String,
    /// sqlx pool size (default: `10`).
    pub db_max_connections: u32,
    /// Interval between scheduler sweeps (default: 30 seconds).
    pub poll_interval: Duration,
    /// Max hotels reconciled per sweep (default: `50`).
    pub batch_hotels: i64,
    /// Apply embedded migrations at startup (default: `true`).
    pub run_migrations: bool,
    pub log_format: LogFormat,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default |
    /// |----------------------------|---------|
    /// | `DATABASE_URL`             | required |
    /// | `DB_MAX_CONNECTIONS`       | `10`    |
    /// | `RECONCILE_POLL_SECS`      | `30`    |
    /// | `RECONCILE_BATCH_HOTELS`   | `50`    |
    /// | `RECONCILE_RUN_MIGRATIONS` | `true`  |
    /// | `LOG_FORMAT`               | `text`  |
    ///
    /// Panics with a descriptive message on a missing database URL or an
    /// unparsable value; the worker cannot start without them.
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let db_max_connections: u32 = env_or("DB_MAX_CONNECTIONS", "10")
            .parse()
            .expect("DB_MAX_CONNECTIONS must be a valid u32");

        let poll_secs: u64 = env_or("RECONCILE_POLL_SECS", "30")
            .parse()
            .expect("RECONCILE_POLL_SECS must be a valid u64");

        let batch_hotels: i64 = env_or("RECONCILE_BATCH_HOTELS", "50")
            .parse()
            .expect("RECONCILE_BATCH_HOTELS must be a valid i64");

        let run_migrations = parse_flag(&env_or("RECONCILE_RUN_MIGRATIONS", "true"))
            .expect("RECONCILE_RUN_MIGRATIONS must be true or false");

        let log_format: LogFormat = env_or("LOG_FORMAT", "text")
            .parse()
            .unwrap_or_else(|e: String| panic!("LOG_FORMAT: {e}"));

        Self {
            database_url,
            db_max_connections,
            poll_interval: Duration::from_secs(poll_secs),
            batch_hotels,
            run_migrations,
            log_format,
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.into())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}
