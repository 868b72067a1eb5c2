//! Raw FFI layer over the bundled `SQLite` shipped by `libsqlite3-sys`.
//!
//! [`RawDb`] owns a `sqlite3*` and [`RawStmt`] owns a `sqlite3_stmt*`. Both
//! release their handle on drop. This is the **only** file that contains
//! `unsafe` code or C types; everything above it works with safe wrappers.
//!
//! Connections are closed with `sqlite3_close`, which fails while any
//! statement of the connection is still alive. Owners drop their statements
//! before the connection.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;

use libsqlite3_sys as sys;

use super::error::{DbError, DbResult};

// ── SQLite constants ────────────────────────────────────────────────────

pub const SQLITE_OK: c_int = sys::SQLITE_OK;
pub const SQLITE_MISUSE: c_int = sys::SQLITE_MISUSE;
pub const SQLITE_TOOBIG: c_int = sys::SQLITE_TOOBIG;
pub const SQLITE_MISMATCH: c_int = sys::SQLITE_MISMATCH;
pub const SQLITE_ROW: c_int = sys::SQLITE_ROW;
pub const SQLITE_DONE: c_int = sys::SQLITE_DONE;

// Open flags
pub const SQLITE_OPEN_READWRITE: c_int = sys::SQLITE_OPEN_READWRITE;
pub const SQLITE_OPEN_CREATE: c_int = sys::SQLITE_OPEN_CREATE;
pub const SQLITE_OPEN_FULLMUTEX: c_int = sys::SQLITE_OPEN_FULLMUTEX;

// ── Connection handle ───────────────────────────────────────────────────

/// Owned `sqlite3*` handle. Closed when dropped.
pub struct RawDb {
    db: *mut sys::sqlite3,
}

// Safety: the handle is opened with SQLITE_OPEN_FULLMUTEX and every owner
// above this layer serializes access behind a `Mutex`.
unsafe impl Send for RawDb {}

impl RawDb {
    /// Opens a connection with the given `SQLITE_OPEN_*` flags.
    pub fn open(path: &str, flags: c_int) -> DbResult<Self> {
        let c_path = CString::new(path).map_err(|e| {
            DbError::new(SQLITE_MISUSE, format!("invalid path: {e}"))
        })?;
        let mut db: *mut sys::sqlite3 = ptr::null_mut();
        let rc = unsafe {
            sys::sqlite3_open_v2(c_path.as_ptr(), &mut db, flags, ptr::null())
        };
        if rc != SQLITE_OK {
            // A handle is usually allocated even on failure; it carries the
            // message and must still be closed.
            let msg = if db.is_null() {
                format!("sqlite3_open_v2 returned {rc}")
            } else {
                let m = errmsg(db);
                unsafe {
                    sys::sqlite3_close(db);
                }
                m
            };
            return Err(DbError::new(rc, msg));
        }
        Ok(Self { db })
    }

    /// Runs one or more semicolon-separated statements via `sqlite3_exec`.
    pub fn exec(&self, sql: &str) -> DbResult<()> {
        let c_sql = CString::new(sql).map_err(|e| {
            DbError::new(SQLITE_MISUSE, format!("nul in SQL: {e}"))
        })?;
        let mut err: *mut c_char = ptr::null_mut();
        let rc = unsafe {
            sys::sqlite3_exec(self.db, c_sql.as_ptr(), None, ptr::null_mut(), &mut err)
        };
        if rc != SQLITE_OK {
            let msg = if err.is_null() {
                errmsg(self.db)
            } else {
                let s = unsafe { CStr::from_ptr(err) }
                    .to_string_lossy()
                    .into_owned();
                unsafe {
                    sys::sqlite3_free(err.cast());
                }
                s
            };
            return Err(DbError::new(rc, msg));
        }
        Ok(())
    }

    /// Compiles a single statement.
    pub fn prepare(&self, sql: &str) -> DbResult<RawStmt> {
        let c_sql = CString::new(sql).map_err(|e| {
            DbError::new(SQLITE_MISUSE, format!("nul in SQL: {e}"))
        })?;
        let mut stmt: *mut sys::sqlite3_stmt = ptr::null_mut();
        let rc = unsafe {
            sys::sqlite3_prepare_v2(
                self.db,
                c_sql.as_ptr(),
                -1,
                &mut stmt,
                ptr::null_mut(),
            )
        };
        if rc != SQLITE_OK {
            return Err(DbError::new(rc, errmsg(self.db)));
        }
        if stmt.is_null() {
            // Empty SQL or a lone comment compiles to nothing.
            return Err(DbError::new(SQLITE_MISUSE, "statement is empty"));
        }
        Ok(RawStmt { stmt, db: self.db })
    }
}

impl Drop for RawDb {
    fn drop(&mut self) {
        if !self.db.is_null() {
            unsafe {
                sys::sqlite3_close(self.db);
            }
            self.db = ptr::null_mut();
        }
    }
}

// ── Statement handle ────────────────────────────────────────────────────

/// Owned `sqlite3_stmt*` handle. Finalized when dropped.
pub struct RawStmt {
    stmt: *mut sys::sqlite3_stmt,
    /// Owning connection, kept for `sqlite3_errmsg`.
    db: *mut sys::sqlite3,
}

// Safety: see `RawDb`. A statement is only ever driven by the thread that
// currently holds its owner's lock.
unsafe impl Send for RawStmt {}

impl RawStmt {
    /// Resets the statement so it can be stepped again. Bindings are kept.
    pub fn reset(&self) -> DbResult<()> {
        let rc = unsafe { sys::sqlite3_reset(self.stmt) };
        self.check(rc)
    }

    /// Runs one step, returning `SQLITE_ROW` or `SQLITE_DONE`.
    pub fn step(&self) -> DbResult<c_int> {
        let rc = unsafe { sys::sqlite3_step(self.stmt) };
        match rc {
            SQLITE_ROW | SQLITE_DONE => Ok(rc),
            _ => Err(self.error(rc)),
        }
    }

    // ── Binding (1-indexed) ─────────────────────────────────────────────

    pub fn bind_i32(&self, idx: c_int, value: i32) -> DbResult<()> {
        let rc = unsafe { sys::sqlite3_bind_int(self.stmt, idx, value) };
        self.check(rc)
    }

    pub fn bind_i64(&self, idx: c_int, value: i64) -> DbResult<()> {
        let rc = unsafe { sys::sqlite3_bind_int64(self.stmt, idx, value) };
        self.check(rc)
    }

    pub fn bind_f64(&self, idx: c_int, value: f64) -> DbResult<()> {
        // SQLite stores NaN as NULL.
        if value.is_nan() {
            return Err(DbError::new(SQLITE_MISMATCH, "NaN cannot be bound"));
        }
        let rc = unsafe { sys::sqlite3_bind_double(self.stmt, idx, value) };
        self.check(rc)
    }

    /// Binds text by exact byte length; `SQLite` copies the buffer.
    pub fn bind_text(&self, idx: c_int, value: &str) -> DbResult<()> {
        let len = c_int::try_from(value.len())
            .map_err(|_| DbError::new(SQLITE_TOOBIG, "text too large to bind"))?;
        let rc = unsafe {
            sys::sqlite3_bind_text(
                self.stmt,
                idx,
                value.as_ptr().cast::<c_char>(),
                len,
                sys::SQLITE_TRANSIENT(),
            )
        };
        self.check(rc)
    }

    /// Binds a blob by exact byte length; `SQLite` copies the buffer.
    pub fn bind_blob(&self, idx: c_int, value: &[u8]) -> DbResult<()> {
        let len = c_int::try_from(value.len())
            .map_err(|_| DbError::new(SQLITE_TOOBIG, "blob too large to bind"))?;
        // An empty slice may carry a dangling pointer; bind a zero-length blob
        // explicitly so it never reads as NULL.
        if len == 0 {
            let rc = unsafe { sys::sqlite3_bind_zeroblob(self.stmt, idx, 0) };
            return self.check(rc);
        }
        let rc = unsafe {
            sys::sqlite3_bind_blob(
                self.stmt,
                idx,
                value.as_ptr().cast(),
                len,
                sys::SQLITE_TRANSIENT(),
            )
        };
        self.check(rc)
    }

    // ── Column reading (0-indexed) ──────────────────────────────────────

    pub fn column_i32(&self, idx: c_int) -> i32 {
        unsafe { sys::sqlite3_column_int(self.stmt, idx) }
    }

    pub fn column_i64(&self, idx: c_int) -> i64 {
        unsafe { sys::sqlite3_column_int64(self.stmt, idx) }
    }

    pub fn column_f64(&self, idx: c_int) -> f64 {
        unsafe { sys::sqlite3_column_double(self.stmt, idx) }
    }

    /// Copies a text column. NULL reads as the empty string.
    pub fn column_text(&self, idx: c_int) -> String {
        unsafe {
            // Fetch the pointer before the length, as the SQLite docs require.
            let ptr = sys::sqlite3_column_text(self.stmt, idx);
            let len = sys::sqlite3_column_bytes(self.stmt, idx);
            if ptr.is_null() || len <= 0 {
                return String::new();
            }
            let bytes =
                std::slice::from_raw_parts(ptr, usize::try_from(len).unwrap_or(0));
            String::from_utf8_lossy(bytes).into_owned()
        }
    }

    /// Copies a blob column. NULL reads as an empty `Vec`.
    pub fn column_blob(&self, idx: c_int) -> Vec<u8> {
        unsafe {
            let ptr = sys::sqlite3_column_blob(self.stmt, idx);
            let len = sys::sqlite3_column_bytes(self.stmt, idx);
            if ptr.is_null() || len <= 0 {
                return Vec::new();
            }
            std::slice::from_raw_parts(ptr.cast::<u8>(), usize::try_from(len).unwrap_or(0))
                .to_vec()
        }
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    fn check(&self, rc: c_int) -> DbResult<()> {
        if rc == SQLITE_OK {
            Ok(())
        } else {
            Err(self.error(rc))
        }
    }

    fn error(&self, rc: c_int) -> DbError {
        DbError::new(rc, errmsg(self.db))
    }
}

impl Drop for RawStmt {
    fn drop(&mut self) {
        if !self.stmt.is_null() {
            unsafe {
                sys::sqlite3_finalize(self.stmt);
            }
            self.stmt = ptr::null_mut();
        }
    }
}

fn errmsg(db: *mut sys::sqlite3) -> String {
    unsafe {
        let ptr = sys::sqlite3_errmsg(db);
        if ptr.is_null() {
            "unknown error".to_string()
        } else {
            CStr::from_ptr(ptr).to_string_lossy().into_owned()
        }
    }
}
