//! Open-time and per-write options.

use serde::{Deserialize, Serialize};

/// Options controlling how [`Db::open`](crate::Db::open) treats the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Create the database if it is missing.
    pub create_if_missing: bool,
    /// Fail with [`StatusKind::IoError`](crate::StatusKind::IoError) if the
    /// database file already exists.
    pub error_if_exists: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            error_if_exists: false,
        }
    }
}

/// Options controlling a single write (`put`, `del` or `write`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    /// Wait for the write to reach stable storage before acknowledging it.
    ///
    /// Sync writes are considerably slower. Changing this between calls
    /// switches the connection's `synchronous` pragma.
    pub sync: bool,
}

impl WriteOptions {
    /// Options for a synchronous (crash-safe) write.
    #[must_use]
    pub const fn sync() -> Self {
        Self { sync: true }
    }
}
