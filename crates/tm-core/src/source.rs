//! Migration script discovery.
//!
//! [`MigrationSource`] is the only way the engine reaches migration scripts.
//! [`FsSource`] reads the `up/` and `down/` directories on disk;
//! [`MemorySource`] keeps scripts in memory for tests and embedded use.

use crate::error::{CoreError, CoreResult};
use crate::migration_name::{Direction, MigrationName};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Paths of the two script artifacts written by [`MigrationSource::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedMigration {
    pub name: MigrationName,
    pub up: String,
    pub down: String,
}

/// Backing store of migration scripts.
pub trait MigrationSource {
    /// All known migrations, ascending by index.
    fn list(&self) -> CoreResult<Vec<MigrationName>>;

    /// Raw script text for one side of a migration.
    fn open(&self, name: &MigrationName, direction: Direction) -> CoreResult<String>;

    /// Write empty up and down scripts for `name`.
    fn create(&self, name: &MigrationName) -> CoreResult<CreatedMigration>;

    /// One past the highest existing index, or 0 for an empty source.
    fn next_index(&self) -> CoreResult<u64> {
        Ok(index_after(&self.list()?))
    }
}

/// One past the highest index in an ascending list.
fn index_after(names: &[MigrationName]) -> u64 {
    names.last().map_or(0, |name| name.index().saturating_add(1))
}

/// Filesystem-backed source with sibling `up` and `down` directories.
#[derive(Debug, Clone)]
pub struct FsSource {
    up_dir: PathBuf,
    down_dir: PathBuf,
}

impl FsSource {
    /// Create a source over the given script directories.
    pub fn new(up_dir: impl Into<PathBuf>, down_dir: impl Into<PathBuf>) -> Self {
        Self {
            up_dir: up_dir.into(),
            down_dir: down_dir.into(),
        }
    }

    /// Directory holding scripts for `direction`.
    pub fn dir(&self, direction: Direction) -> &Path {
        match direction {
            Direction::Up => &self.up_dir,
            Direction::Down => &self.down_dir,
        }
    }

    fn script_path(&self, name: &MigrationName, direction: Direction) -> PathBuf {
        self.dir(direction).join(name.file_name())
    }
}

impl MigrationSource for FsSource {
    fn list(&self) -> CoreResult<Vec<MigrationName>> {
        let unreadable = |source| CoreError::SourceUnreadable {
            path: self.up_dir.display().to_string(),
            source,
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.up_dir).map_err(unreadable)? {
            let entry = entry.map_err(unreadable)?;
            if !entry.file_type().map_err(unreadable)?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                log::warn!(
                    "Skipping non UTF-8 file in {}: {:?}",
                    self.up_dir.display(),
                    entry.path()
                );
                continue;
            };
            match MigrationName::from_file_name(file_name) {
                Some(name) => names.push(name?),
                None => log::warn!("Skipping non-migration file: {}", entry.path().display()),
            }
        }

        names.sort();
        Ok(names)
    }

    fn open(&self, name: &MigrationName, direction: Direction) -> CoreResult<String> {
        let path = self.script_path(name, direction);
        fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => CoreError::MigrationNotFound {
                name: name.to_string(),
                direction,
            },
            _ => CoreError::IoWithPath {
                path: path.display().to_string(),
                source: e,
            },
        })
    }

    fn create(&self, name: &MigrationName) -> CoreResult<CreatedMigration> {
        let up = self.script_path(name, Direction::Up);
        let down = self.script_path(name, Direction::Down);

        create_empty(&up)?;
        if let Err(e) = create_empty(&down) {
            // Leave no half-created migration behind
            if let Err(cleanup) = fs::remove_file(&up) {
                log::warn!("Failed to remove {}: {cleanup}", up.display());
            }
            return Err(e);
        }

        Ok(CreatedMigration {
            name: name.clone(),
            up: up.display().to_string(),
            down: down.display().to_string(),
        })
    }

    fn next_index(&self) -> CoreResult<u64> {
        if !self.up_dir.exists() {
            return Ok(0);
        }
        Ok(index_after(&self.list()?))
    }
}

/// Create an empty file, creating parent directories and refusing to overwrite.
fn create_empty(path: &Path) -> CoreResult<()> {
    let io_err = |source| CoreError::IoWithPath {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    match fs::OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(CoreError::MigrationExists {
            path: path.display().to_string(),
        }),
        Err(e) => Err(io_err(e)),
    }
}

/// In-memory source, keyed by name.
///
/// Scripts are added with [`MemorySource::with_migration`]; a migration
/// created through [`MigrationSource::create`] starts with empty scripts.
#[derive(Debug, Default)]
pub struct MemorySource {
    scripts: RefCell<BTreeMap<MigrationName, (String, String)>>,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a migration with its up and down scripts.
    pub fn insert(
        &self,
        name: &str,
        up: impl Into<String>,
        down: impl Into<String>,
    ) -> CoreResult<MigrationName> {
        let name = MigrationName::parse(name)?;
        self.scripts
            .borrow_mut()
            .insert(name.clone(), (up.into(), down.into()));
        Ok(name)
    }

    /// Builder form of [`insert`](Self::insert) for fixtures.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not a valid migration name.
    pub fn with_migration(self, name: &str, up: &str, down: &str) -> Self {
        if let Err(e) = self.insert(name, up, down) {
            panic!("invalid fixture migration: {e}");
        }
        self
    }
}

impl MigrationSource for MemorySource {
    fn list(&self) -> CoreResult<Vec<MigrationName>> {
        Ok(self.scripts.borrow().keys().cloned().collect())
    }

    fn open(&self, name: &MigrationName, direction: Direction) -> CoreResult<String> {
        let scripts = self.scripts.borrow();
        let (up, down) = scripts
            .get(name)
            .ok_or_else(|| CoreError::MigrationNotFound {
                name: name.to_string(),
                direction,
            })?;
        Ok(match direction {
            Direction::Up => up.clone(),
            Direction::Down => down.clone(),
        })
    }

    fn create(&self, name: &MigrationName) -> CoreResult<CreatedMigration> {
        let mut scripts = self.scripts.borrow_mut();
        if scripts.contains_key(name) {
            return Err(CoreError::MigrationExists {
                path: name.to_string(),
            });
        }
        scripts.insert(name.clone(), (String::new(), String::new()));
        Ok(CreatedMigration {
            name: name.clone(),
            up: format!("memory:up/{}", name.file_name()),
            down: format!("memory:down/{}", name.file_name()),
        })
    }
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
