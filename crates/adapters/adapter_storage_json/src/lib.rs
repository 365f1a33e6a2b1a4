//! # wirehome-adapter-storage-json
//!
//! Filesystem implementation of the [`Storage`] port: JSON documents under a
//! typed directory tree rooted at the configured data directory, e.g.
//!
//! ```text
//! Components/<uid>/configuration.json
//! Components/<uid>/settings.json
//! ComponentGroups/<uid>/Components/<componentUid>/settings.json
//! ```
//!
//! Writes are atomic (write-temp + rename) so a crash mid-write never leaves
//! a half-written document behind.

pub mod error;

use std::fs;
use std::path::PathBuf;

use serde_json::Value;
use wildmatch::WildMatch;

use wirehome_app::ports::Storage;
use wirehome_domain::error::Result;

use crate::error::StorageError;

/// JSON document store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The configured data directory.
    #[must_use]
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// Join path segments below the root, rejecting segments that could
    /// escape it.
    fn resolve(&self, path: &[&str]) -> std::result::Result<PathBuf, StorageError> {
        let mut resolved = self.root.clone();
        for segment in path {
            if segment.is_empty()
                || *segment == ".."
                || segment.contains('/')
                || segment.contains('\\')
            {
                return Err(StorageError::InvalidPathSegment((*segment).to_string()));
            }
            resolved.push(segment);
        }
        Ok(resolved)
    }
}

impl Storage for JsonStorage {
    fn try_read(&self, path: &[&str]) -> Result<Option<Value>> {
        let file = self.resolve(path)?;
        let content = match fs::read(&file) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StorageError::from(err).into()),
        };
        let value = serde_json::from_slice(&content).map_err(StorageError::from)?;
        Ok(Some(value))
    }

    fn write(&self, value: &Value, path: &[&str]) -> Result<()> {
        let file = self.resolve(path)?;
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).map_err(StorageError::from)?;
        }

        let content = serde_json::to_vec_pretty(value).map_err(StorageError::from)?;
        let temp = file.with_extension("json.tmp");
        fs::write(&temp, content).map_err(StorageError::from)?;
        fs::rename(&temp, &file).map_err(StorageError::from)?;
        Ok(())
    }

    fn enumerate_directories(&self, pattern: &str, path: &[&str]) -> Result<Vec<String>> {
        let directory = self.resolve(path)?;
        let entries = match fs::read_dir(&directory) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StorageError::from(err).into()),
        };

        let matcher = WildMatch::new(pattern);
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(StorageError::from)?;
            let is_directory = entry
                .file_type()
                .map_err(StorageError::from)?
                .is_dir();
            if !is_directory {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if matcher.matches(&name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete_directory(&self, path: &[&str]) -> Result<()> {
        let directory = self.resolve(path)?;
        match fs::remove_dir_all(&directory) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::from(err).into()),
        }
    }
}
