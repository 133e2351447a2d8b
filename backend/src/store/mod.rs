//! Relational store: pooled SQLite connections, schema bootstrap and the repositories.
//!
//! All consistency (primary keys, the unique username, the patient foreign key with its
//! cascade delete) is delegated to SQLite at the single-statement level. Nothing here takes
//! an in-process lock.

mod patients;
mod payments;
pub mod schema;
pub mod scope;
pub mod set_clause;
mod users;

pub use patients::PatientRepo;
pub use payments::PaymentRepo;
pub use scope::{scoped_where, OwnerScope};
pub use set_clause::{SetClause, Statement};
pub use users::UserRepo;

use common::Timestamp;
use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::{Type, Value};
use rusqlite::{ffi, Row};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The id/owner predicate matched no row. Deliberately silent about which half failed.
    #[error("record not found")]
    NotFound,

    #[error("referenced patient does not exist: {0}")]
    ForeignKey(String),

    #[error("conflicting record: {0}")]
    Conflict(String),

    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(ref failure, ref msg) = err {
            let detail = msg.clone().unwrap_or_else(|| failure.to_string());
            match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => return StoreError::ForeignKey(detail),
                ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE => {
                    return StoreError::Conflict(detail)
                }
                _ => {}
            }
        }
        StoreError::Sqlite(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

pub type Connection = PooledConnection<SqliteConnectionManager>;

/// Sizing and lifetime limits for the connection pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_open: u32,
    pub min_idle: u32,
    pub max_idle_time: Duration,
    pub max_lifetime: Duration,
    /// How long a caller waits for a free connection.
    pub acquire_timeout: Duration,
    /// How long a statement waits on a locked database.
    pub busy_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_open: 10,
            min_idle: 2,
            max_idle_time: Duration::from_secs(15 * 60),
            max_lifetime: Duration::from_secs(2 * 60 * 60),
            acquire_timeout: Duration::from_secs(10),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// Shared handle to the pooled database. Cheap to clone.
#[derive(Clone)]
pub struct Store {
    pool: r2d2::Pool<SqliteConnectionManager>,
}

impl Store {
    /// Open (creating if needed) the database file at `path`.
    pub fn open<P: AsRef<Path>>(path: P, config: &PoolConfig) -> StoreResult<Self> {
        let busy_timeout = config.busy_timeout;
        let manager = SqliteConnectionManager::file(path)
            .with_init(move |conn| prepare_connection(conn, busy_timeout));
        let pool = r2d2::Pool::builder()
            .max_size(config.max_open)
            .min_idle(Some(config.min_idle.min(config.max_open)))
            .idle_timeout(Some(config.max_idle_time))
            .max_lifetime(Some(config.max_lifetime))
            .connection_timeout(config.acquire_timeout)
            .build(manager)?;
        Ok(Self { pool })
    }

    /// Single-connection in-memory database (for testing).
    ///
    /// The one connection is never recycled, since every new in-memory connection would
    /// start from an empty database.
    pub fn open_in_memory() -> StoreResult<Self> {
        let manager = SqliteConnectionManager::memory()
            .with_init(|conn| prepare_connection(conn, Duration::from_secs(5)));
        let pool = r2d2::Pool::builder()
            .max_size(1)
            .min_idle(Some(1))
            .idle_timeout(None)
            .max_lifetime(None)
            .connection_timeout(Duration::from_secs(5))
            .build(manager)?;
        Ok(Self { pool })
    }

    /// Check out a connection, waiting at most the configured acquisition timeout.
    pub fn conn(&self) -> StoreResult<Connection> {
        Ok(self.pool.get()?)
    }
}

fn prepare_connection(conn: &mut rusqlite::Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    conn.busy_timeout(busy_timeout)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")
}

/// Bind value for a timestamp column: the zero sentinel becomes NULL.
pub(crate) fn time_value(ts: &Timestamp) -> Value {
    if ts.is_zero() {
        Value::Null
    } else {
        Value::Text(ts.to_rfc3339())
    }
}

/// Read a nullable timestamp column; NULL reads back as the zero sentinel.
pub(crate) fn read_time(row: &Row<'_>, idx: usize) -> rusqlite::Result<Timestamp> {
    match row.get::<_, Option<String>>(idx)? {
        Some(text) => Timestamp::parse(&text)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
        None => Ok(Timestamp::ZERO),
    }
}

pub(crate) fn read_text(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
}
