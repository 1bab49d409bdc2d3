//! SQLite connection handle shared by the record stores.
//!
//! One connection sits behind a mutex; every multi-statement write runs inside a single
//! `BEGIN IMMEDIATE` transaction so key generation and the writes that depend on it are
//! serialized against other writers of the same database file.

mod schema;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, TransactionBehavior};
use tracing::debug;

use crate::business::RepositoryError;
use crate::config::DatabaseConfig;

const BUSY_TIMEOUT: Duration = Duration::from_millis(5_000);

/// SQL function lowercasing text with full Unicode case mapping; SQLite's `lower` and
/// `LIKE` only fold ASCII.
const FOLD_FUNCTION: &str = "appcenter_fold";

/// Cloneable handle to the application center database.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        debug!(path = %path.display(), "opened application center database");
        Self::bootstrap(conn)
    }

    pub fn in_memory() -> Result<Self, RepositoryError> {
        let conn = Connection::open_in_memory()?;
        Self::bootstrap(conn)
    }

    pub fn from_config(config: &DatabaseConfig) -> Result<Self, RepositoryError> {
        match config {
            DatabaseConfig::InMemory => Self::in_memory(),
            DatabaseConfig::File(path) => Self::open(path),
        }
    }

    fn bootstrap(conn: Connection) -> Result<Self, RepositoryError> {
        conn.create_scalar_function(
            FOLD_FUNCTION,
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let value: Option<String> = ctx.get(0)?;
                Ok(value.map(|text| text.to_lowercase()))
            },
        )?;
        conn.execute_batch(schema::SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run read-only work against the connection.
    pub fn with_connection<T, F>(&self, work: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&Connection) -> Result<T, RepositoryError>,
    {
        let guard = self.lock()?;
        work(&guard)
    }

    /// Run `work` inside one immediate transaction, committing only when it succeeds.
    pub fn transaction<T, F>(&self, work: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&Connection) -> Result<T, RepositoryError>,
    {
        let mut guard = self.lock()?;
        let tx = guard.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = work(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, RepositoryError> {
        self.conn
            .lock()
            .map_err(|_| RepositoryError::Unavailable("connection mutex poisoned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_count(db: &Database) -> i64 {
        db.with_connection(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name LIKE 'appcenter_%'",
                [],
                |row| row.get(0),
            )?)
        })
        .expect("count tables")
    }

    #[test]
    fn bootstrap_creates_all_tables() {
        let db = Database::in_memory().expect("in-memory database");
        assert_eq!(table_count(&db), 5);
    }

    #[test]
    fn failed_transaction_rolls_back() {
        let db = Database::in_memory().expect("in-memory database");
        let result: Result<(), RepositoryError> = db.transaction(|conn| {
            conn.execute(
                "INSERT INTO appcenter_demand_type (id_demand_type, label) VALUES ('T1', 'one')",
                [],
            )?;
            Err(RepositoryError::Unavailable("abort".to_string()))
        });
        assert!(result.is_err());

        let count: i64 = db
            .with_connection(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM appcenter_demand_type", [], |row| {
                    row.get(0)
                })?)
            })
            .expect("count rows");
        assert_eq!(count, 0);
    }

    #[test]
    fn reopening_a_file_keeps_rows() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("appcenter.db");
        {
            let db = Database::open(&path).expect("open file database");
            db.transaction(|conn| {
                conn.execute(
                    "INSERT INTO appcenter_demand_type (id_demand_type, label) VALUES ('T1', 'one')",
                    [],
                )?;
                Ok(())
            })
            .expect("insert row");
        }

        let db = Database::from_config(&DatabaseConfig::File(path)).expect("reopen database");
        let label: String = db
            .with_connection(|conn| {
                Ok(conn.query_row(
                    "SELECT label FROM appcenter_demand_type WHERE id_demand_type = 'T1'",
                    [],
                    |row| row.get(0),
                )?)
            })
            .expect("read row");
        assert_eq!(label, "one");
    }
}
