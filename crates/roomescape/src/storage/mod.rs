//! Storage layer for roomescape.
//!
//! This module owns the `SQLite` connection. A [`Database`] is a cheap,
//! cloneable handle; every DAO holds one and runs its statements through
//! [`Database::with_conn`].

pub mod migrations;
pub mod schema;
pub mod seed;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Shared handle to the reservation database.
#[derive(Debug, Clone)]
pub struct Database {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection, shared by every clone of the handle.
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create a database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist,
    /// and brings the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;",
        )?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory database, used by tests and throwaway runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` with exclusive access to the connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if a previous holder panicked, or
    /// whatever `f` returns.
    pub fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        f(&conn)
    }

    /// Run `f` inside one transaction, committing if it returns `Ok` and
    /// rolling back otherwise.
    ///
    /// `f` goes through DAOs that take the connection lock per statement, so
    /// the lock is not held across it. Statements issued through other
    /// clones while `f` runs join the same transaction.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or an error if the transaction cannot be
    /// started or committed.
    pub fn in_transaction<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        self.with_conn(|conn| Ok(conn.execute_batch("BEGIN IMMEDIATE")?))?;

        match f() {
            Ok(value) => {
                self.with_conn(|conn| Ok(conn.execute_batch("COMMIT")?))?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = self.with_conn(|conn| Ok(conn.execute_batch("ROLLBACK")?)) {
                    warn!("Rollback failed after {}: {}", err, rollback);
                }
                Err(err)
            }
        }
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<DatabaseStats> {
        let (members, themes, reservation_times, reservations) = self.with_conn(|conn| {
            let count = |table: &str| -> Result<i64> {
                let sql = format!("SELECT COUNT(*) FROM {table}");
                Ok(conn.query_row(&sql, [], |row| row.get(0))?)
            };
            Ok((
                count("member")?,
                count("theme")?,
                count("reservation_time")?,
                count("reservation")?,
            ))
        })?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(DatabaseStats {
            members,
            themes,
            reservation_times,
            reservations,
            db_size_bytes,
        })
    }
}

/// Row counts and size of the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseStats {
    /// Registered members.
    pub members: i64,
    /// Themes on offer.
    pub themes: i64,
    /// Bookable time slots.
    pub reservation_times: i64,
    /// Reservations made.
    pub reservations: i64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
