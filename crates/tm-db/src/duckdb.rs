//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use duckdb::{params_from_iter, Connection};
use std::path::Path;

/// DuckDB database backend
///
/// Single-threaded: the engine issues one statement at a time, so the
/// connection is owned directly rather than behind a lock.
pub struct DuckDbBackend {
    conn: Connection,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self { conn })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn transaction_control(&self, operation: &'static str, sql: &str) -> DbResult<()> {
        log::debug!("{sql}");
        self.conn
            .execute_batch(sql)
            .map_err(|e| DbError::TransactionError {
                operation,
                message: e.to_string(),
            })
    }
}

impl Database for DuckDbBackend {
    fn execute(&self, sql: &str) -> DbResult<()> {
        log::debug!("Executing: {sql}");
        self.conn
            .execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(format!("{e}: {sql}")))
    }

    fn execute_with(&self, sql: &str, params: &[&str]) -> DbResult<usize> {
        log::debug!("Executing: {sql} {params:?}");
        self.conn
            .execute(sql, params_from_iter(params.iter()))
            .map_err(|e| DbError::ExecutionError(format!("{e}: {sql}")))
    }

    fn query_rows(&self, sql: &str, params: &[&str]) -> DbResult<Vec<Vec<String>>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| DbError::ExecutionError(format!("prepare failed: {e}: {sql}")))?;

        // Column count is only known once the statement has run, so read it per row.
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                let col_count = row.as_ref().column_count();
                Ok((0..col_count)
                    .map(|i| get_column_as_string(row, i))
                    .collect::<Vec<_>>())
            })
            .map_err(|e| DbError::ExecutionError(format!("query failed: {e}: {sql}")))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DbError::ExecutionError(format!("row error: {e}")))?;
        Ok(rows)
    }

    fn begin(&self) -> DbResult<()> {
        self.transaction_control("begin", "BEGIN TRANSACTION")
    }

    fn commit(&self) -> DbResult<()> {
        self.transaction_control("commit", "COMMIT")
    }

    fn rollback(&self) -> DbResult<()> {
        self.transaction_control("rollback", "ROLLBACK")
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

/// Read a column value as a String, trying multiple DuckDB types.
///
/// DuckDB integer columns return `None` for `Option<String>`, so we try
/// String -> i64 -> f64 -> bool -> "null".
fn get_column_as_string(row: &duckdb::Row<'_>, idx: usize) -> String {
    if let Ok(Some(s)) = row.get::<_, Option<String>>(idx) {
        return s;
    }
    if let Ok(Some(n)) = row.get::<_, Option<i64>>(idx) {
        return n.to_string();
    }
    if let Ok(Some(f)) = row.get::<_, Option<f64>>(idx) {
        return f.to_string();
    }
    if let Ok(Some(b)) = row.get::<_, Option<bool>>(idx) {
        return b.to_string();
    }
    "null".to_string()
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
