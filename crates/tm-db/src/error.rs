//! Error types for tm-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Transaction control error (D003)
    #[error("[D003] Transaction {operation} failed: {message}")]
    TransactionError {
        operation: &'static str,
        message: String,
    },
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;
