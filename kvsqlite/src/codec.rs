//! Mapping between Rust key/value types and `SQLite` column types.
//!
//! | Rust type            | Bound / read as |
//! |----------------------|-----------------|
//! | `i32`                | INTEGER         |
//! | `i64`                | INTEGER         |
//! | `f64`                | REAL            |
//! | `String` / `str`     | TEXT            |
//! | `Vec<u8>` / `[u8]`   | BLOB            |
//!
//! [`Bind`] is implemented for every type that can be passed as a key or a
//! value, including the borrowed forms. [`Codec`] adds the column read-back
//! and is implemented for the owned types a [`Db`](crate::Db) can be
//! parameterized with. Supporting a new type means adding one impl of each;
//! nothing else changes.
//!
//! No cross-type coercion is attempted here. Reading a column with a codec
//! that does not match what was stored yields whatever `SQLite`'s own
//! conversion rules produce.

use crate::error::DbResult;
use crate::statement::Statement;

/// A value that can be bound to a statement parameter.
pub trait Bind {
    /// Binds `self` to parameter `index` (1-based) of `stmt`.
    ///
    /// # Errors
    ///
    /// Returns the engine error if the bind is rejected.
    fn bind(&self, stmt: &Statement, index: usize) -> DbResult<()>;
}

/// A key or value type a [`Db`](crate::Db) can store.
pub trait Codec: Bind + Sized {
    /// Reads column `index` (0-based) of the current row of `stmt`.
    fn extract(stmt: &Statement, index: usize) -> Self;
}

impl Bind for i32 {
    fn bind(&self, stmt: &Statement, index: usize) -> DbResult<()> {
        stmt.bind_i32(index, *self)
    }
}

impl Codec for i32 {
    fn extract(stmt: &Statement, index: usize) -> Self {
        stmt.column_i32(index)
    }
}

impl Bind for i64 {
    fn bind(&self, stmt: &Statement, index: usize) -> DbResult<()> {
        stmt.bind_i64(index, *self)
    }
}

impl Codec for i64 {
    fn extract(stmt: &Statement, index: usize) -> Self {
        stmt.column_i64(index)
    }
}

impl Bind for f64 {
    fn bind(&self, stmt: &Statement, index: usize) -> DbResult<()> {
        stmt.bind_f64(index, *self)
    }
}

impl Codec for f64 {
    fn extract(stmt: &Statement, index: usize) -> Self {
        stmt.column_f64(index)
    }
}

impl Bind for str {
    fn bind(&self, stmt: &Statement, index: usize) -> DbResult<()> {
        stmt.bind_text(index, self)
    }
}

impl Bind for String {
    fn bind(&self, stmt: &Statement, index: usize) -> DbResult<()> {
        self.as_str().bind(stmt, index)
    }
}

impl Codec for String {
    fn extract(stmt: &Statement, index: usize) -> Self {
        stmt.column_text(index)
    }
}

impl Bind for [u8] {
    fn bind(&self, stmt: &Statement, index: usize) -> DbResult<()> {
        stmt.bind_blob(index, self)
    }
}

impl Bind for Vec<u8> {
    fn bind(&self, stmt: &Statement, index: usize) -> DbResult<()> {
        self.as_slice().bind(stmt, index)
    }
}

/// Blobs are copied out of the row: the engine's buffer is only valid until
/// the statement is stepped or reset again.
impl Codec for Vec<u8> {
    fn extract(stmt: &Statement, index: usize) -> Self {
        stmt.column_blob(index)
    }
}
