//! tm-core - Core library for Tidemark
//!
//! This crate provides the shared types used across Tidemark: migration
//! names and ordering, project configuration, statement splitting for
//! migration scripts, and the migration source abstraction.

pub mod config;
pub mod error;
pub mod migration_name;
pub mod parser;
pub mod source;

pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use migration_name::{slugify, Direction, MigrationName};
pub use parser::{parse_statements, Script, Statements};
pub use source::{CreatedMigration, FsSource, MemorySource, MigrationSource};
