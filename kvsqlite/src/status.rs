//! Result status of key-value operations.
//!
//! Every engine failure is translated into a [`Status`] right where it
//! happens: the engine message becomes the *driver text*, a description of
//! the failing step becomes the *database text*, and the failure is
//! classified into a coarse [`StatusKind`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DbError;
use crate::ffi;

/// Native error code used for failures not raised by the engine.
const NO_NATIVE_CODE: &str = "0";

/// Coarse classification of a [`Status`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    /// Success. The only non-failure kind.
    #[default]
    NoError,
    /// Point lookup on an absent key.
    NotFound,
    /// Malformed call (invalid path, use after close).
    InvalidArgument,
    /// File-system level open failure, or the target exists when exclusive
    /// creation was requested.
    IoError,
    /// Any other engine failure: DDL, prepare, bind, step, transaction
    /// control.
    UnknownError,
}

/// Outcome of a key-value operation.
///
/// The default value is success. Two statuses are equal iff their kinds are
/// equal; the messages are informational only.
#[derive(Debug, Default, Clone)]
pub struct Status {
    driver_text: String,
    database_text: String,
    kind: StatusKind,
    native_error_code: String,
}

/// Result type of the key-value surface.
///
/// An `Err` never carries [`StatusKind::NoError`].
pub type KvResult<T> = Result<T, Status>;

impl Status {
    /// Creates a status from its four parts.
    #[must_use]
    pub fn new(
        driver_text: impl Into<String>,
        database_text: impl Into<String>,
        kind: StatusKind,
        native_error_code: impl Into<String>,
    ) -> Self {
        Self {
            driver_text: driver_text.into(),
            database_text: database_text.into(),
            kind,
            native_error_code: native_error_code.into(),
        }
    }

    /// Engine failure described by `context`.
    pub(crate) fn engine(err: DbError, context: impl Into<String>, kind: StatusKind) -> Self {
        Self::new(err.message, context, kind, err.code.to_string())
    }

    /// Lookup miss for a single key: the get statement stepped straight to
    /// `SQLITE_DONE`.
    pub(crate) fn not_found() -> Self {
        Self::new("", "Not found.", StatusKind::NotFound, ffi::SQLITE_DONE.to_string())
    }

    /// Malformed call that never reached the engine.
    pub(crate) fn invalid_argument(context: impl Into<String>) -> Self {
        Self::new("", context, StatusKind::InvalidArgument, NO_NATIVE_CODE)
    }

    /// File-system failure that never reached the engine.
    pub(crate) fn io_error(context: impl Into<String>) -> Self {
        Self::new("", context, StatusKind::IoError, NO_NATIVE_CODE)
    }

    /// Failure outside the engine that fits no other kind.
    pub(crate) fn unknown(context: impl Into<String>) -> Self {
        Self::new("", context, StatusKind::UnknownError, NO_NATIVE_CODE)
    }

    /// Message reported by the engine, empty when the engine was not involved.
    #[must_use]
    pub fn driver_text(&self) -> &str {
        &self.driver_text
    }

    /// Description of the step that failed.
    #[must_use]
    pub fn database_text(&self) -> &str {
        &self.database_text
    }

    /// Classification of the status.
    #[must_use]
    pub const fn kind(&self) -> StatusKind {
        self.kind
    }

    /// Engine result code in string form (`"0"` when not engine-raised).
    #[must_use]
    pub fn native_error_code(&self) -> &str {
        &self.native_error_code
    }

    /// Returns `true` for success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.kind == StatusKind::NoError
    }

    /// Returns `true` if a lookup found no entry.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == StatusKind::NotFound
    }
}

impl PartialEq for Status {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Status {}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return Ok(());
        }
        write!(f, "{} {}", self.database_text, self.driver_text)
    }
}

impl std::error::Error for Status {}

impl<T> From<&KvResult<T>> for Status {
    fn from(result: &KvResult<T>) -> Self {
        match result {
            Ok(_) => Self::default(),
            Err(status) => status.clone(),
        }
    }
}
