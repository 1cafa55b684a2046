//! tm-db - Database abstraction layer for Tidemark
//!
//! This crate provides the `Database` trait the migration engine runs
//! against, a `Transaction` handle for work that must commit atomically,
//! and the DuckDB implementation.

pub mod duckdb;
pub mod error;
pub mod traits;
pub mod transaction;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::Database;
pub use transaction::{with_transaction, Transaction};
