//! Fixed table schema and the three statements prepared against it.

use crate::codec::{Bind, Codec};
use crate::connection::Connection;
use crate::error::DbError;
use crate::statement::{Statement, StepResult};
use crate::status::{KvResult, Status, StatusKind};

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS KVTable(key PRIMARY KEY, value)";
const PUT_SQL: &str = "INSERT OR REPLACE INTO KVTable(key, value) VALUES (?, ?)";
const GET_SQL: &str = "SELECT value FROM KVTable WHERE key = ?";
const DELETE_SQL: &str = "DELETE FROM KVTable WHERE key = ?";

/// Creates the key-value table if it does not exist yet.
pub(crate) fn ensure_schema(conn: &Connection) -> KvResult<()> {
    conn.execute_batch(CREATE_TABLE_SQL)
        .map_err(|err| exec_failure(err, CREATE_TABLE_SQL))
}

/// The put, get and delete statements of one connection.
///
/// Statements are finalized in field order when the cache is dropped: get,
/// put, delete. The cache must be dropped before its connection.
pub(crate) struct StatementCache {
    get: Statement,
    put: Statement,
    delete: Statement,
}

impl StatementCache {
    /// Prepares all three statements, or none.
    pub(crate) fn prepare(conn: &Connection) -> KvResult<Self> {
        let put = prepare(conn, PUT_SQL)?;
        let get = prepare(conn, GET_SQL)?;
        let delete = prepare(conn, DELETE_SQL)?;
        Ok(Self { get, put, delete })
    }

    /// Inserts or replaces `key`.
    pub(crate) fn put<Q, R>(&self, key: &Q, value: &R) -> KvResult<()>
    where
        Q: Bind + ?Sized,
        R: Bind + ?Sized,
    {
        let stmt = &self.put;
        run(stmt, || {
            key.bind(stmt, 1).map_err(|err| unknown(err, "Fail to bind key."))?;
            value.bind(stmt, 2).map_err(|err| unknown(err, "Fail to bind value."))?;
            step_done(stmt)
        })
    }

    /// Looks up `key`.
    pub(crate) fn get<Q, V>(&self, key: &Q) -> KvResult<V>
    where
        Q: Bind + ?Sized,
        V: Codec,
    {
        let stmt = &self.get;
        run(stmt, || {
            key.bind(stmt, 1).map_err(|err| unknown(err, "Fail to bind key."))?;
            match stmt.step() {
                Ok(StepResult::Row) => Ok(V::extract(stmt, 0)),
                Ok(StepResult::Done) => Err(Status::not_found()),
                Err(err) => Err(unknown(err, "Fail to sqlite3_step.")),
            }
        })
    }

    /// Removes `key`; an absent key is not an error.
    pub(crate) fn delete<Q>(&self, key: &Q) -> KvResult<()>
    where
        Q: Bind + ?Sized,
    {
        let stmt = &self.delete;
        run(stmt, || {
            key.bind(stmt, 1).map_err(|err| unknown(err, "Fail to bind key."))?;
            step_done(stmt)
        })
    }
}

/// Resets `stmt`, runs `body` against it and resets it again so no read stays
/// open and a failed step does not leak into the next use.
fn run<T>(stmt: &Statement, body: impl FnOnce() -> KvResult<T>) -> KvResult<T> {
    stmt.reset()
        .map_err(|err| unknown(err, "Fail to sqlite3_reset."))?;
    let result = body();
    // The code returned here repeats the step failure, if any, which `body`
    // has already reported.
    let _ = stmt.reset();
    result
}

fn step_done(stmt: &Statement) -> KvResult<()> {
    match stmt.step() {
        Ok(StepResult::Done) => Ok(()),
        Ok(StepResult::Row) => Err(Status::unknown("Fail to sqlite3_step.")),
        Err(err) => Err(unknown(err, "Fail to sqlite3_step.")),
    }
}

fn prepare(conn: &Connection, sql: &str) -> KvResult<Statement> {
    conn.prepare(sql).map_err(|err| exec_failure(err, sql))
}

/// Failure of a DDL, pragma or transaction-control statement, or of
/// preparing one of the cached statements.
pub(crate) fn exec_failure(err: DbError, sql: &str) -> Status {
    Status::engine(err, format!("Fail to exec:{sql}"), StatusKind::UnknownError)
}

fn unknown(err: DbError, context: &str) -> Status {
    Status::engine(err, context, StatusKind::UnknownError)
}
