//! Configuration types and parsing for tidemark.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file names probed in a project directory, in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["tidemark.yml", "tidemark.yaml"];

/// Path value that selects a transient in-memory database.
pub const MEMORY_DATABASE: &str = ":memory:";

const DEFAULT_DB_PATH: &str = "tidemark.duckdb";

/// Project configuration from tidemark.yml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Migration script locations and ledger table
    #[serde(default)]
    pub migrations: MigrationsConfig,
}

/// Database connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// DuckDB file path, or `:memory:`
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Migration script directories and the ledger table name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationsConfig {
    /// Directory holding "up" scripts
    #[serde(default = "default_up_dir")]
    pub up_dir: String,

    /// Directory holding "down" scripts
    #[serde(default = "default_down_dir")]
    pub down_dir: String,

    /// Ledger table recording applied migrations
    #[serde(default = "default_table")]
    pub table: String,
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            up_dir: default_up_dir(),
            down_dir: default_down_dir(),
            table: default_table(),
        }
    }
}

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

fn default_up_dir() -> String {
    "migrations/up".to_string()
}

fn default_down_dir() -> String {
    "migrations/down".to_string()
}

fn default_table() -> String {
    "migrations".to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                path: path.display().to_string(),
                source: e,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory.
    ///
    /// Looks for tidemark.yml or tidemark.yaml; falls back to defaults when
    /// neither exists.
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        match CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
        {
            Some(path) => {
                log::debug!("Loading config from {}", path.display());
                Self::load(&path)
            }
            None => {
                log::debug!("No config file in {}, using defaults", dir.display());
                Ok(Self::default())
            }
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.database.path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.path cannot be empty".to_string(),
            });
        }
        if self.migrations.up_dir.trim().is_empty() || self.migrations.down_dir.trim().is_empty()
        {
            return Err(CoreError::ConfigInvalid {
                message: "migrations.up_dir and migrations.down_dir cannot be empty".to_string(),
            });
        }
        if self.migrations.up_dir == self.migrations.down_dir {
            return Err(CoreError::ConfigInvalid {
                message: "migrations.up_dir and migrations.down_dir must differ".to_string(),
            });
        }
        validate_identifier(&self.migrations.table)
    }

    /// Get absolute "up" script directory relative to a project root
    pub fn up_dir_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.migrations.up_dir)
    }

    /// Get absolute "down" script directory relative to a project root
    pub fn down_dir_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.migrations.down_dir)
    }

    /// Resolve the database location, preferring `override_path` when given.
    ///
    /// Relative paths resolve against `root`; `:memory:` is passed through.
    pub fn database_path(&self, root: &Path, override_path: Option<&str>) -> String {
        let path = override_path.unwrap_or(&self.database.path);
        if path == MEMORY_DATABASE {
            return path.to_string();
        }
        root.join(path).display().to_string()
    }
}

/// Check that `name` is a bare SQL identifier safe to splice into statements.
pub fn validate_identifier(name: &str) -> CoreResult<()> {
    let valid = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(CoreError::ConfigInvalid {
            message: format!(
                "invalid table name '{name}': must contain only alphanumeric characters and underscores and not start with a digit"
            ),
        })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
