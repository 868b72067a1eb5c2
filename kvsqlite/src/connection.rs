//! Safe wrapper around a `SQLite` database connection.
//!
//! This file contains **no `unsafe` code**. All FFI interaction is delegated to
//! [`ffi::RawDb`] which encapsulates the raw pointers and C type conversions.

use std::path::Path;

use super::error::DbResult;
use super::ffi::{self, RawDb};
use super::statement::Statement;
use super::transaction::Transaction;

/// A `SQLite` database connection.
///
/// Closed when dropped. Not `Sync`: the key-value layer keeps it behind the
/// `Mutex` of its [`Db`](crate::Db).
pub struct Connection {
    db: RawDb,
}

impl Connection {
    /// Opens a database at `path` for reading and writing.
    ///
    /// With `create = false` a missing file is an error instead of being
    /// created. An empty path opens a private temporary on-disk database and
    /// `":memory:"` a pure in-memory one.
    ///
    /// # Errors
    ///
    /// Returns the engine error if the file cannot be opened.
    pub fn open(path: &Path, create: bool) -> DbResult<Self> {
        let path_str = path.to_string_lossy();
        let mut flags = ffi::SQLITE_OPEN_READWRITE | ffi::SQLITE_OPEN_FULLMUTEX;
        if create {
            flags |= ffi::SQLITE_OPEN_CREATE;
        }
        let db = RawDb::open(&path_str, flags)?;
        Ok(Self { db })
    }

    /// Executes one or more SQL statements separated by semicolons.
    ///
    /// No result rows are returned. Suitable for DDL, PRAGMAs and
    /// transaction control.
    ///
    /// # Errors
    ///
    /// Returns the engine error of the first failing statement.
    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.db.exec(sql)
    }

    /// Prepares a single SQL statement.
    ///
    /// # Errors
    ///
    /// Returns the engine error if the SQL does not compile.
    pub fn prepare(&self, sql: &str) -> DbResult<Statement> {
        let raw_stmt = self.db.prepare(sql)?;
        Ok(Statement::new(raw_stmt))
    }

    /// Begins a deferred transaction.
    ///
    /// # Errors
    ///
    /// Returns the engine error if `BEGIN` fails (e.g. a transaction is
    /// already open).
    pub fn transaction(&self) -> DbResult<Transaction<'_>> {
        Transaction::begin(self)
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

#[cfg(test)]
impl Connection {
    /// Opens an in-memory database.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::open(Path::new(":memory:"), true)
    }
}
