//! Database access layer with connection pooling
//!
//! `Database` owns the bounded connection pool. Everything else is a set of
//! capabilities over it, organized by concern:
//! - `schema` - idempotent table creation and SQL period functions
//! - `users` - user onboarding and identity lookup
//! - `dimensions` - category and currency lookup/insert
//! - `expenses` - expense inserts
//! - `reports` - period-windowed expense queries
//!
//! Connections are only handed out through scoped acquisition: the pooled
//! guard returns the connection to the pool when dropped, on every exit path.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{ffi, Connection, Transaction, TransactionBehavior};
use serde::Serialize;
use tracing::{debug, info, warn, Span};

use crate::config::LedgerConfig;
use crate::error::{Error, Result};
use crate::logging::Telemetry;

mod dimensions;
mod expenses;
mod reports;
mod schema;
mod users;

pub use schema::SCHEMA_VERSION;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// How long a connection waits on a locked database before SQLITE_BUSY
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Parse a SQLite datetime string into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    // SQLite stores as "YYYY-MM-DD HH:MM:SS" format
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// Map a failed write to a typed error, recognizing foreign key failures
pub(crate) fn write_error(err: rusqlite::Error) -> Error {
    match &err {
        rusqlite::Error::SqliteFailure(failure, msg)
            if failure.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
        {
            Error::ForeignKeyViolation(
                msg.clone()
                    .unwrap_or_else(|| "FOREIGN KEY constraint failed".to_string()),
            )
        }
        _ => Error::Database(err),
    }
}

/// True if the error is a UNIQUE/PRIMARY KEY constraint failure
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                || failure.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

/// Per-connection setup run by the pool for every new connection
fn init_connection(conn: &mut Connection) -> rusqlite::Result<()> {
    conn.execute_batch(&format!(
        "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
        BUSY_TIMEOUT_MS
    ))?;
    schema::register_period_functions(conn)
}

/// Snapshot of pool occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    pub max_size: u32,
    /// Open connections, idle or checked out
    pub connections: u32,
    pub idle: u32,
    pub checked_out: u32,
}

/// Prefix of every r2d2 checkout error message
const CHECKOUT_TIMEOUT: &str = "timed out waiting for connection";

/// Classify a failed checkout.
///
/// r2d2 reports the last connection failure it saw while waiting, if any,
/// after the timeout text. No such failure means every connection stayed
/// checked out for the whole wait.
fn checkout_error(err: &r2d2::Error, timeout: Duration) -> Error {
    classify_checkout(&err.to_string(), timeout)
}

fn classify_checkout(message: &str, timeout: Duration) -> Error {
    match message.strip_prefix(CHECKOUT_TIMEOUT) {
        Some("") => Error::PoolExhausted {
            timeout_ms: timeout.as_millis() as u64,
        },
        Some(rest) => Error::Connectivity(rest.trim_start_matches(": ").to_string()),
        None => Error::Connectivity(message.to_string()),
    }
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: PathBuf,
    acquire_timeout: Duration,
    span: Span,
    /// Owns the directory of an `in_memory` database; declared after `pool`
    /// so connections close before the files are removed
    #[cfg(any(test, feature = "test-utils"))]
    scratch: Option<std::sync::Arc<tempfile::TempDir>>,
}

impl Database {
    /// Open the pool described by `config` and ensure the schema exists.
    pub fn connect(config: &LedgerConfig, telemetry: &Telemetry) -> Result<Self> {
        config.validate()?;
        let span = telemetry.component("db");

        let manager = SqliteConnectionManager::file(&config.database_name).with_init(init_connection);
        let pool = Pool::builder()
            .max_size(config.pool_max)
            .min_idle(Some(config.pool_min))
            .connection_timeout(config.acquire_timeout)
            .build(manager)
            .map_err(|e| {
                Error::Connectivity(format!(
                    "Failed to open {}: {}",
                    config.database_name.display(),
                    e
                ))
            })?;

        info!(
            parent: &span,
            path = %config.database_name.display(),
            pool_min = config.pool_min,
            pool_max = config.pool_max,
            "Connection pool ready"
        );

        let db = Self {
            pool,
            db_path: config.database_name.clone(),
            acquire_timeout: config.acquire_timeout,
            span,
            #[cfg(any(test, feature = "test-utils"))]
            scratch: None,
        };
        db.ensure_schema()?;

        Ok(db)
    }

    /// Open a database file with default pool settings and no telemetry
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::connect(&LedgerConfig::new(path.as_ref()), &Telemetry::disabled())
    }

    /// Create a scratch database in its own temporary directory (for testing)
    ///
    /// Note: Uses a temporary file rather than `:memory:` because every pooled
    /// connection to `:memory:` would see its own empty database. The directory
    /// is removed, WAL files included, when the last clone is dropped.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn in_memory() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("tally_test_")
            .tempdir()
            .map_err(|e| Error::Connectivity(format!("Failed to create scratch directory: {}", e)))?;
        let mut db = Self::open(dir.path().join("tally.db"))?;
        db.scratch = Some(std::sync::Arc::new(dir));
        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Acquire a connection from the pool.
    ///
    /// Waits at most the configured acquire timeout. The connection goes back
    /// to the pool when the returned guard is dropped.
    pub fn conn(&self) -> Result<DbConn> {
        match self.pool.get() {
            Ok(conn) => {
                debug!(parent: &self.span, "Acquired connection");
                Ok(conn)
            }
            Err(e) => {
                let err = checkout_error(&e, self.acquire_timeout);
                warn!(parent: &self.span, error = %err, "Failed to acquire connection");
                Err(err)
            }
        }
    }

    /// Run `f` with a pooled connection, releasing it afterwards
    pub fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn()?;
        f(&conn)
    }

    /// Run `f` inside one write transaction on one pooled connection.
    ///
    /// Commits when `f` returns `Ok`; rolls back when it returns `Err` or panics.
    pub fn with_transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Current pool occupancy
    pub fn status(&self) -> PoolStatus {
        let state = self.pool.state();
        PoolStatus {
            max_size: self.pool.max_size(),
            connections: state.connections,
            idle: state.idle_connections,
            checked_out: state.connections.saturating_sub(state.idle_connections),
        }
    }

    pub(crate) fn span(&self) -> &Span {
        &self.span
    }
}
