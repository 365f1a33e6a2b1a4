//! Storage port — JSON document persistence under a typed directory tree.
//!
//! Documents live at paths like `("Components", uid, "settings.json")`. The
//! trait is synchronous on purpose: registries hold their table lock across
//! the local write so that persistence stays linearized with the bus event
//! that announces it.

use serde_json::Value;

use wirehome_domain::error::Result;

/// Filename of a component's or group's configuration document.
pub const CONFIGURATION_FILENAME: &str = "configuration.json";
/// Filename of a settings document (entities and associations alike).
pub const SETTINGS_FILENAME: &str = "settings.json";

/// Persistence for JSON-shaped values under a directory path.
pub trait Storage {
    /// Read and deserialize a document. A missing file is `Ok(None)`, not an
    /// error.
    fn try_read(&self, path: &[&str]) -> Result<Option<Value>>;

    /// Serialize and write a document, creating parent directories as
    /// needed. The write is atomic (write-temp + rename).
    fn write(&self, value: &Value, path: &[&str]) -> Result<()>;

    /// Immediate sub-directory names matching a glob pattern. A missing
    /// parent yields an empty list.
    fn enumerate_directories(&self, pattern: &str, path: &[&str]) -> Result<Vec<String>>;

    /// Recursively delete a directory. A missing directory is not an error.
    fn delete_directory(&self, path: &[&str]) -> Result<()>;
}

impl<S: Storage + ?Sized> Storage for std::sync::Arc<S> {
    fn try_read(&self, path: &[&str]) -> Result<Option<Value>> {
        (**self).try_read(path)
    }

    fn write(&self, value: &Value, path: &[&str]) -> Result<()> {
        (**self).write(value, path)
    }

    fn enumerate_directories(&self, pattern: &str, path: &[&str]) -> Result<Vec<String>> {
        (**self).enumerate_directories(pattern, path)
    }

    fn delete_directory(&self, path: &[&str]) -> Result<()> {
        (**self).delete_directory(path)
    }
}
