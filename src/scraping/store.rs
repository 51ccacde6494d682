//! Output store for normalized articles
//!
//! Entries are keyed by storage filename and written exactly once. The
//! pipeline never updates or deletes an entry. Content is staged in a
//! hidden file and only appears under its final name once complete, so a
//! failed write leaves no entry behind.

use async_trait::async_trait;
use std::collections::HashSet;
use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prefix of in-progress writes; never listed as entries
const STAGING_PREFIX: &str = ".partial-";

/// Errors from the output store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Entry already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid entry name: {0}")]
    InvalidName(String),
}

/// Write-once key-value persistence
#[async_trait]
pub trait OutputStore: Send + Sync {
    /// Names of every existing entry
    async fn list(&self) -> Result<HashSet<String>, StoreError>;

    /// Create a new entry; fails with [`StoreError::AlreadyExists`] if present
    async fn write_new(&self, name: &str, content: &str) -> Result<(), StoreError>;
}

/// Store backed by one flat directory
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Open a store, creating the directory if needed
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self::new(root);
        tokio::fs::create_dir_all(&store.root)
            .await
            .map_err(|source| store.io_error(&store.root, source))?;
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl OutputStore for DirectoryStore {
    async fn list(&self) -> Result<HashSet<String>, StoreError> {
        let mut names = HashSet::new();
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(names),
            Err(e) => return Err(self.io_error(&self.root, e)),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| self.io_error(&self.root, e))?
        {
            match entry.file_name().to_str() {
                Some(name) if !name.starts_with(STAGING_PREFIX) => {
                    names.insert(name.to_string());
                }
                _ => {}
            }
        }

        Ok(names)
    }

    async fn write_new(&self, name: &str, content: &str) -> Result<(), StoreError> {
        let path = self.entry_path(name)?;

        let root = self.root.clone();
        let target = path.clone();
        let content = content.to_string();
        let written = tokio::task::spawn_blocking(move || {
            write_staged(&root, &target, |file| file.write_all(content.as_bytes()))
        })
        .await
        .map_err(|e| self.io_error(&path, std::io::Error::other(e)))?;

        match written {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(StoreError::AlreadyExists(name.to_string()))
            }
            Err(e) => Err(self.io_error(&path, e)),
        }
    }
}

/// Fill a staging file in `root`, then move it to `path` unless `path` exists.
///
/// The staging file is removed on every error.
fn write_staged(
    root: &Path,
    path: &Path,
    fill: impl FnOnce(&mut File) -> std::io::Result<()>,
) -> std::io::Result<()> {
    let mut staged = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempfile_in(root)?;
    fill(staged.as_file_mut())?;
    staged.as_file().sync_all()?;
    staged.persist_noclobber(path).map_err(|e| e.error)?;
    Ok(())
}
