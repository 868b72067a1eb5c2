//! The typed key-value handle.

use std::borrow::Borrow;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::batch::{BatchOp, WriteBatch};
use crate::cache::{self, StatementCache};
use crate::codec::{Bind, Codec};
use crate::connection::Connection;
use crate::options::{Options, WriteOptions};
use crate::status::{KvResult, Status, StatusKind};

/// Path that opens a pure in-memory database.
pub const MEMORY_PATH: &str = ":memory:";

const SYNC_FULL_SQL: &str = "PRAGMA synchronous = FULL";
const SYNC_OFF_SQL: &str = "PRAGMA synchronous = OFF";

/// A key-value store backed by a single `SQLite` table.
///
/// `K` and `V` are any of `i32`, `i64`, `f64`, `String` and `Vec<u8>`; see
/// [`codec`](crate::codec). Keys and values can be passed in borrowed form
/// (`&str` for `String`, `&[u8]` for `Vec<u8>`).
///
/// Every operation holds an internal lock for its whole duration, so a `Db`
/// can be shared between threads and its operations never interleave. Two
/// `Db` values, even on the same file, do not serialize with each other;
/// that is left to `SQLite`'s own locking.
///
/// # Example
///
/// ```no_run
/// use kvsqlite::{Db, Options, WriteOptions};
///
/// let db = Db::<String, String>::open(&Options::default(), "kvsqlite.db")?;
/// db.put(&WriteOptions::default(), "key1", "value1")?;
/// assert_eq!(db.get("key1")?, "value1");
/// db.del(&WriteOptions::default(), "key1")?;
/// assert!(db.get("key1").unwrap_err().is_not_found());
/// # Ok::<(), kvsqlite::Status>(())
/// ```
pub struct Db<K, V> {
    inner: Mutex<DbInner>,
    _types: PhantomData<fn() -> (K, V)>,
}

/// State guarded by the `Db` lock.
///
/// Fields drop in declaration order, so statements are finalized before the
/// connection is closed even without an explicit [`close`](Self::close).
struct DbInner {
    statements: Option<StatementCache>,
    conn: Option<Connection>,
    /// Durability mode currently set on the connection.
    sync: bool,
}

impl<K: Codec, V: Codec> Db<K, V> {
    /// Opens the store at `path`, creating the backing table if needed.
    ///
    /// An empty path opens a private temporary on-disk store that is deleted
    /// on close; [`MEMORY_PATH`] opens a pure in-memory store. Neither ever
    /// counts as existing for [`Options::error_if_exists`].
    ///
    /// Writes start out asynchronous (`PRAGMA synchronous = OFF`).
    ///
    /// # Errors
    ///
    /// - [`StatusKind::IoError`] if the file exists and
    ///   `error_if_exists` is set, or the engine cannot open it.
    /// - [`StatusKind::InvalidArgument`] if the path contains a NUL byte.
    /// - [`StatusKind::UnknownError`] if configuring the connection, creating
    ///   the table or preparing the statements fails.
    ///
    /// Nothing stays open when this returns an error.
    pub fn open(options: &Options, path: impl AsRef<Path>) -> KvResult<Self> {
        let path = path.as_ref();
        Self::open_inner(options, path).inspect_err(|status| {
            warn!(path = %path.display(), %status, "failed to open key-value store");
        })
    }

    fn open_inner(options: &Options, path: &Path) -> KvResult<Self> {
        let shown = path.display();
        if path.to_string_lossy().contains('\0') {
            return Err(Status::invalid_argument(format!(
                "Invalid argument, path contains a NUL byte:{shown}"
            )));
        }
        if options.error_if_exists && !is_transient(path) && path.exists() {
            return Err(Status::io_error(format!("File already exist:{shown}")));
        }

        let conn = Connection::open(path, options.create_if_missing).map_err(|err| {
            Status::engine(err, format!("Fail to open:{shown}"), StatusKind::IoError)
        })?;
        set_synchronous(&conn, false)?;
        cache::ensure_schema(&conn)?;
        let statements = StatementCache::prepare(&conn)?;

        debug!(path = %shown, "opened key-value store");
        Ok(Self {
            inner: Mutex::new(DbInner {
                statements: Some(statements),
                conn: Some(conn),
                sync: false,
            }),
            _types: PhantomData,
        })
    }

    /// Sets `key` to `value`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// [`StatusKind::UnknownError`] if switching durability, binding or
    /// stepping fails; [`StatusKind::InvalidArgument`] after
    /// [`close`](Self::close).
    pub fn put<Q, R>(&self, options: &WriteOptions, key: &Q, value: &R) -> KvResult<()>
    where
        K: Borrow<Q>,
        V: Borrow<R>,
        Q: Bind + ?Sized,
        R: Bind + ?Sized,
    {
        let mut inner = self.lock_inner()?;
        inner.apply_durability(options)?;
        inner.statements()?.put(key, value)
    }

    /// Returns the value stored under `key`.
    ///
    /// Byte values are copied out of the engine's row buffer before the lock
    /// is released.
    ///
    /// # Errors
    ///
    /// [`StatusKind::NotFound`] if `key` is absent; otherwise as for
    /// [`put`](Self::put).
    pub fn get<Q>(&self, key: &Q) -> KvResult<V>
    where
        K: Borrow<Q>,
        Q: Bind + ?Sized,
    {
        let inner = self.lock_inner()?;
        inner.statements()?.get(key)
    }

    /// Removes `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// As for [`put`](Self::put).
    pub fn del<Q>(&self, options: &WriteOptions, key: &Q) -> KvResult<()>
    where
        K: Borrow<Q>,
        Q: Bind + ?Sized,
    {
        let mut inner = self.lock_inner()?;
        inner.apply_durability(options)?;
        inner.statements()?.delete(key)
    }

    /// Applies every operation of `batch` in order, in one transaction.
    ///
    /// Either all operations take effect or none do. Durability is switched
    /// once for the whole batch. The batch itself is left untouched.
    ///
    /// # Errors
    ///
    /// The status of the first failing operation, or of `BEGIN`/`COMMIT`. The
    /// transaction is rolled back before the error is returned.
    pub fn write(&self, options: &WriteOptions, batch: &WriteBatch<K, V>) -> KvResult<()> {
        let mut inner = self.lock_inner()?;
        inner.apply_durability(options)?;
        let (conn, statements) = inner.parts()?;

        let tx = conn
            .transaction()
            .map_err(|err| cache::exec_failure(err, "BEGIN"))?;
        for op in batch {
            let applied = match op {
                BatchOp::Put { key, value } => statements.put(key, value),
                BatchOp::Delete { key } => statements.delete(key),
            };
            if let Err(status) = applied {
                if let Err(err) = tx.rollback() {
                    warn!(%err, "rollback of failed write batch failed");
                }
                return Err(status);
            }
        }
        // A failed COMMIT drops the transaction, which rolls it back.
        tx.commit().map_err(|err| cache::exec_failure(err, "COMMIT"))?;

        debug!(ops = batch.len(), "committed write batch");
        Ok(())
    }
}

impl<K, V> Db<K, V> {
    /// Finalizes the cached statements, then closes the connection.
    ///
    /// Safe to call more than once; dropping the `Db` calls it too. Any later
    /// operation fails with [`StatusKind::InvalidArgument`].
    pub fn close(&self) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .close();
    }

    /// Returns `true` once [`close`](Self::close) has run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .conn
            .is_none()
    }

    fn lock_inner(&self) -> KvResult<MutexGuard<'_, DbInner>> {
        self.inner
            .lock()
            .map_err(|_| Status::unknown("Database mutex poisoned."))
    }
}

impl<K, V> Drop for Db<K, V> {
    fn drop(&mut self) {
        self.inner
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .close();
    }
}

impl<K, V> std::fmt::Debug for Db<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db").finish_non_exhaustive()
    }
}

impl DbInner {
    fn statements(&self) -> KvResult<&StatementCache> {
        self.statements.as_ref().ok_or_else(closed)
    }

    fn parts(&self) -> KvResult<(&Connection, &StatementCache)> {
        match (&self.conn, &self.statements) {
            (Some(conn), Some(statements)) => Ok((conn, statements)),
            _ => Err(closed()),
        }
    }

    /// Switches the connection's durability mode if `options` asks for a
    /// different one. The memo only changes once the pragma succeeded.
    fn apply_durability(&mut self, options: &WriteOptions) -> KvResult<()> {
        if self.sync == options.sync {
            return Ok(());
        }
        let conn = self.conn.as_ref().ok_or_else(closed)?;
        set_synchronous(conn, options.sync)?;
        self.sync = options.sync;
        debug!(sync = options.sync, "switched write durability");
        Ok(())
    }

    fn close(&mut self) {
        // Statements before the connection.
        drop(self.statements.take());
        if self.conn.take().is_some() {
            debug!("closed key-value store");
        }
    }
}

fn set_synchronous(conn: &Connection, sync: bool) -> KvResult<()> {
    let sql = if sync { SYNC_FULL_SQL } else { SYNC_OFF_SQL };
    conn.execute_batch(sql)
        .map_err(|err| cache::exec_failure(err, sql))
}

fn is_transient(path: &Path) -> bool {
    path.as_os_str().is_empty() || path == Path::new(MEMORY_PATH)
}

fn closed() -> Status {
    Status::invalid_argument("Database is closed.")
}
