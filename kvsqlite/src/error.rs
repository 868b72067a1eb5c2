//! Engine-level error type for the safe `SQLite` wrapper.
//!
//! [`DbError`] is what the wrapper layers return. The public KV surface
//! translates it into a [`Status`](crate::Status) with a context message.

use std::fmt;

use thiserror::Error;

/// Result code returned by `SQLite`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbErrorCode(pub i32);

impl fmt::Display for DbErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned by engine operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("sqlite error {code}: {message}")]
pub struct DbError {
    /// `SQLite` result code.
    pub code: DbErrorCode,
    /// Engine message (from `sqlite3_errmsg` or `sqlite3_exec` when available).
    pub message: String,
}

impl DbError {
    /// Creates a new database error.
    pub(crate) fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code: DbErrorCode(code),
            message: message.into(),
        }
    }
}

/// Result type for engine operations.
pub type DbResult<T> = Result<T, DbError>;
