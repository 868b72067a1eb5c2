//! Safe wrapper around a `SQLite` prepared statement.
//!
//! This file contains **no `unsafe` code**. All FFI interaction is delegated to
//! [`ffi::RawStmt`] which encapsulates the raw pointers and C type conversions.

use std::os::raw::c_int;

use super::error::DbResult;
use super::ffi::{self, RawStmt};

/// Result of a single `sqlite3_step` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// A result row is available.
    Row,
    /// The statement has finished executing.
    Done,
}

/// A prepared `SQLite` statement.
///
/// Created via [`Connection::prepare`](super::Connection::prepare) and
/// finalized when dropped. A statement can be reset and re-bound any number
/// of times, which is how the key-value layer reuses its cached statements.
pub struct Statement {
    raw: RawStmt,
}

impl Statement {
    /// Wraps a raw statement handle.
    pub(super) const fn new(raw: RawStmt) -> Self {
        Self { raw }
    }

    /// Resets the statement so it can be stepped again.
    ///
    /// Bound parameters are kept until they are re-bound.
    ///
    /// # Errors
    ///
    /// Returns the error of the most recent failed step, if any.
    pub fn reset(&self) -> DbResult<()> {
        self.raw.reset()
    }

    /// Executes a single step.
    ///
    /// # Errors
    ///
    /// Returns an error for any result code other than `SQLITE_ROW` and
    /// `SQLITE_DONE`.
    pub fn step(&self) -> DbResult<StepResult> {
        if self.raw.step()? == ffi::SQLITE_ROW {
            Ok(StepResult::Row)
        } else {
            Ok(StepResult::Done)
        }
    }

    // ── Binding (parameters are 1-indexed) ──────────────────────────────

    /// Binds a 32-bit integer.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range or the statement is busy.
    pub fn bind_i32(&self, idx: usize, value: i32) -> DbResult<()> {
        self.raw.bind_i32(c_index(idx), value)
    }

    /// Binds a 64-bit integer.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range or the statement is busy.
    pub fn bind_i64(&self, idx: usize, value: i64) -> DbResult<()> {
        self.raw.bind_i64(c_index(idx), value)
    }

    /// Binds a double.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is NaN, the index is out of range or the
    /// statement is busy.
    pub fn bind_f64(&self, idx: usize, value: f64) -> DbResult<()> {
        self.raw.bind_f64(c_index(idx), value)
    }

    /// Binds UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range, the statement is busy or
    /// the text is too large.
    pub fn bind_text(&self, idx: usize, value: &str) -> DbResult<()> {
        self.raw.bind_text(c_index(idx), value)
    }

    /// Binds a byte range with its exact length.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range, the statement is busy or
    /// the blob is too large.
    pub fn bind_blob(&self, idx: usize, value: &[u8]) -> DbResult<()> {
        self.raw.bind_blob(c_index(idx), value)
    }

    // ── Column reading (columns are 0-indexed) ──────────────────────────

    /// Reads a column as `i32`.
    #[must_use]
    pub fn column_i32(&self, idx: usize) -> i32 {
        self.raw.column_i32(c_index(idx))
    }

    /// Reads a column as `i64`.
    #[must_use]
    pub fn column_i64(&self, idx: usize) -> i64 {
        self.raw.column_i64(c_index(idx))
    }

    /// Reads a column as `f64`.
    #[must_use]
    pub fn column_f64(&self, idx: usize) -> f64 {
        self.raw.column_f64(c_index(idx))
    }

    /// Reads a column as a UTF-8 string. Returns an empty string for NULL.
    #[must_use]
    pub fn column_text(&self, idx: usize) -> String {
        self.raw.column_text(c_index(idx))
    }

    /// Reads a column as a blob. Returns an empty `Vec` for NULL.
    #[must_use]
    pub fn column_blob(&self, idx: usize) -> Vec<u8> {
        self.raw.column_blob(c_index(idx))
    }
}

impl std::fmt::Debug for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Statement").finish_non_exhaustive()
    }
}

// Out-of-range indices saturate. SQLite rejects such a parameter with
// SQLITE_RANGE and reads such a column as NULL.
fn c_index(idx: usize) -> c_int {
    c_int::try_from(idx).unwrap_or(c_int::MAX)
}
