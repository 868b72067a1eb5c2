//! Typed key-value store on top of an embedded `SQLite` database.
//!
//! A [`Db<K, V>`] keeps one table with a unique `key` column and an untyped
//! `value` column and exposes it through a narrow contract: [`Db::open`],
//! [`Db::put`], [`Db::get`], [`Db::del`] and [`Db::write`] for atomic
//! [`WriteBatch`]es. SQL never leaks out of this crate.
//!
//! Every operation reuses one of three statements prepared at open time.
//! Failures are reported as a [`Status`] that carries the engine message, a
//! description of the failing step and a coarse [`StatusKind`].
//!
//! The engine is the bundled `SQLite` from `libsqlite3-sys`. The `ffi` module
//! is the **only** file that contains `unsafe` code or C types; the
//! [`Connection`], [`Statement`] and [`Transaction`] wrappers above it are
//! safe and are exported for implementing additional [`Codec`]s.

mod ffi;

mod batch;
mod cache;
pub mod codec;
mod connection;
mod db;
pub mod error;
mod options;
mod statement;
mod status;
mod transaction;

pub use batch::{BatchOp, WriteBatch};
pub use codec::{Bind, Codec};
pub use connection::Connection;
pub use db::{Db, MEMORY_PATH};
pub use error::DbError;
pub use options::{Options, WriteOptions};
pub use statement::{Statement, StepResult};
pub use status::{KvResult, Status, StatusKind};
pub use transaction::Transaction;
