//! Strongly-typed migration name and direction.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// File extension shared by every migration script.
pub const SCRIPT_EXTENSION: &str = "sql";

/// Canonical migration identifier of the form `<index>_<slug>`.
///
/// Ordering is by numeric index first, so `10_x` sorts after `2_y`; the full
/// name only breaks ties between equal indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct MigrationName {
    index: u64,
    name: String,
}

impl MigrationName {
    /// Parse a name such as `3_add_genre`.
    pub fn parse(name: impl Into<String>) -> CoreResult<Self> {
        let name = name.into();
        let invalid = |reason: &str| CoreError::InvalidMigrationName {
            name: name.clone(),
            reason: reason.to_string(),
        };

        let (prefix, rest) = name
            .split_once('_')
            .ok_or_else(|| invalid("expected <index>_<name>"))?;
        if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("index prefix must be a non-negative integer"));
        }
        if rest.is_empty() {
            return Err(invalid("name after the index must not be empty"));
        }
        if name.contains(['/', '\\']) {
            return Err(invalid("must not contain path separators"));
        }
        let index = prefix
            .parse::<u64>()
            .map_err(|_| invalid("index prefix is out of range"))?;

        Ok(Self { index, name })
    }

    /// Build the canonical name for a new migration from a free-form description.
    pub fn compose(index: u64, description: &str) -> CoreResult<Self> {
        let slug = slugify(description);
        if slug.is_empty() {
            return Err(CoreError::InvalidMigrationName {
                name: description.to_string(),
                reason: "description must not be blank".to_string(),
            });
        }
        Self::parse(format!("{index}_{slug}"))
    }

    /// Parse a script file name (`3_add_genre.sql`), returning `None` for other extensions.
    pub fn from_file_name(file_name: &str) -> Option<CoreResult<Self>> {
        let stem = file_name.strip_suffix(SCRIPT_EXTENSION)?.strip_suffix('.')?;
        Some(Self::parse(stem))
    }

    /// Numeric ordering index.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Return the underlying name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Script file name for this migration, e.g. `3_add_genre.sql`.
    pub fn file_name(&self) -> String {
        format!("{}.{SCRIPT_EXTENSION}", self.name)
    }
}

impl fmt::Display for MigrationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl AsRef<str> for MigrationName {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl From<MigrationName> for String {
    fn from(name: MigrationName) -> Self {
        name.name
    }
}

impl TryFrom<String> for MigrationName {
    type Error = CoreError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl PartialEq<str> for MigrationName {
    fn eq(&self, other: &str) -> bool {
        self.name == other
    }
}

impl PartialEq<&str> for MigrationName {
    fn eq(&self, other: &&str) -> bool {
        self.name == *other
    }
}

/// Which side of a migration to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Apply the migration
    Up,
    /// Revert the migration
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// Lower-case `description` and collapse each whitespace run into a single `_`.
pub fn slugify(description: &str) -> String {
    description
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
#[path = "migration_name_test.rs"]
mod tests;
