//! Error types for tm-core

use crate::migration_name::Direction;
use thiserror::Error;

/// Core error type for Tidemark
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Failed to parse configuration file
    #[error("[E001] Failed to parse config {path}: {source}")]
    ConfigParseError {
        path: String,
        source: serde_yaml::Error,
    },

    /// E002: Invalid configuration value
    #[error("[E002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E003: Migration file name does not follow `<index>_<slug>`
    #[error("[E003] Invalid migration name '{name}': {reason}")]
    InvalidMigrationName { name: String, reason: String },

    /// E004: Migration directory could not be read
    #[error("[E004] Failed to read migrations directory '{path}': {source}")]
    SourceUnreadable {
        path: String,
        source: std::io::Error,
    },

    /// E005: No script exists for the requested migration and direction
    #[error("[E005] Migration '{name}' has no {direction} script")]
    MigrationNotFound { name: String, direction: Direction },

    /// E006: Refusing to overwrite an existing migration script
    #[error("[E006] Migration script already exists: {path}")]
    MigrationExists { path: String },

    /// E007: Script had no executable content
    #[error("[E007] Migration script is empty")]
    EmptyScript,

    /// E008: IO error with file path context
    #[error("[E008] IO error on '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

impl CoreError {
    /// True for the discovery family: unreadable source, missing or duplicate scripts.
    pub fn is_discovery(&self) -> bool {
        matches!(
            self,
            CoreError::SourceUnreadable { .. }
                | CoreError::MigrationNotFound { .. }
                | CoreError::MigrationExists { .. }
                | CoreError::InvalidMigrationName { .. }
                | CoreError::IoWithPath { .. }
        )
    }
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
