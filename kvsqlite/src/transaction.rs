//! Safe wrapper around a `SQLite` transaction.

use super::connection::Connection;
use super::error::DbResult;

/// An open database transaction.
///
/// Automatically rolls back on drop unless committed or rolled back
/// explicitly.
pub struct Transaction<'conn> {
    conn: &'conn Connection,
    finished: bool,
}

impl<'conn> Transaction<'conn> {
    /// Begins a new transaction on `conn`.
    pub(super) fn begin(conn: &'conn Connection) -> DbResult<Self> {
        conn.execute_batch("BEGIN")?;
        Ok(Self {
            conn,
            finished: false,
        })
    }

    /// Commits the transaction.
    ///
    /// # Errors
    ///
    /// Returns the `COMMIT` error. The transaction is then rolled back when
    /// it is dropped, so nothing of it stays visible.
    pub fn commit(mut self) -> DbResult<()> {
        self.conn.execute_batch("COMMIT")?;
        self.finished = true;
        Ok(())
    }

    /// Rolls the transaction back.
    ///
    /// # Errors
    ///
    /// Returns the `ROLLBACK` error.
    pub fn rollback(mut self) -> DbResult<()> {
        self.finished = true;
        self.conn.execute_batch("ROLLBACK")
    }
}

impl std::fmt::Debug for Transaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            // Best-effort rollback.
            if let Err(err) = self.conn.execute_batch("ROLLBACK") {
                tracing::warn!(%err, "rollback of abandoned transaction failed");
            }
        }
    }
}
