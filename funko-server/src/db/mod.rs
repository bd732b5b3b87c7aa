//! Database Module
//!
//! Owns the SQLite connection pool, runs migrations and hands out write
//! transactions. Reads go straight through the pool; writes are serialized
//! through a single async mutex — SQLite allows one writer at a time, and
//! funneling writers through one guard means a transaction never aborts on
//! a lock upgrade, it just waits its turn.

pub mod repository;

use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::utils::AppError;

/// Database service — owns the SQLite connection pool
#[derive(Clone)]
pub struct DbService {
    pool: SqlitePool,
    write_lock: Arc<Mutex<()>>,
}

/// A write transaction holding the single-writer guard.
///
/// Dropping it without [`WriteTxn::commit`] rolls the transaction back,
/// which is the compensating action for every multi-step order mutation:
/// stock decrements already applied inside the transaction vanish with it.
pub struct WriteTxn {
    txn: Transaction<'static, Sqlite>,
    _guard: OwnedMutexGuard<()>,
}

impl WriteTxn {
    /// Connection for statements inside this transaction.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.txn
    }

    pub async fn commit(self) -> Result<(), sqlx::Error> {
        self.txn.commit().await
    }
}

impl DbService {
    /// Open (or create) the database at `db_path`, with WAL mode and
    /// migrations applied.
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| AppError::Database(format!("Invalid database path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON")
            // Wait up to 5s on write contention instead of failing immediately
            .pragma("busy_timeout", "5000");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {e}")))?;

        tracing::info!("Database connection established (SQLite WAL, busy_timeout=5000ms)");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to apply migrations: {e}")))?;
        tracing::info!("Database migrations applied");

        Ok(Self {
            pool,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Begin a write transaction. Acquires the single-writer guard first,
    /// so at most one write transaction is in flight.
    pub async fn begin_write(&self) -> Result<WriteTxn, sqlx::Error> {
        let guard = self.write_lock.clone().lock_owned().await;
        let txn = self.pool.begin().await?;
        Ok(WriteTxn { txn, _guard: guard })
    }
}
