//! SourceProvider trait for abstracting where module texts come from.
//!
//! Module import resolution asks a provider for the text behind a location
//! string. The parser itself never touches the filesystem.

use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum SourceError {
    #[error("Source not found: {0}")]
    NotFound(String),

    #[error("Failed to read source '{location}': {message}")]
    ReadFailed { location: String, message: String },

    #[error("Source '{0}' is not valid UTF-8")]
    InvalidEncoding(String),
}

/// Module text shared between the provider cache and its readers.
pub type SharedSource = Arc<str>;

/// Loads module source text by location.
///
/// Locations are opaque strings: relative paths, absolute paths or URIs,
/// as produced by the module manager's location resolution.
pub trait SourceProvider: Send + Sync + Debug {
    fn load(&self, location: &str) -> Result<SharedSource, SourceError>;

    fn exists(&self, location: &str) -> bool;

    /// Name used in log output.
    fn name(&self) -> &'static str;
}

/// Module texts registered ahead of time. Works without a filesystem.
#[derive(Debug, Default)]
pub struct InMemorySourceProvider {
    sources: RwLock<HashMap<String, SharedSource>>,
}

impl InMemorySourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `text` under `location`, replacing any earlier text.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::ReadFailed` if the internal lock is poisoned.
    pub fn add(&self, location: impl Into<String>, text: impl Into<SharedSource>) -> Result<(), SourceError> {
        let location = location.into();
        let mut sources = self.sources.write().map_err(|_| SourceError::ReadFailed {
            location: location.clone(),
            message: "source store lock poisoned".to_string(),
        })?;
        sources.insert(location, text.into());
        Ok(())
    }

    pub fn remove(&self, location: &str) -> Option<SharedSource> {
        self.sources.write().ok()?.remove(location)
    }

    pub fn len(&self) -> usize {
        self.sources.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.sources.read().map(|s| s.is_empty()).unwrap_or(true)
    }
}

impl SourceProvider for InMemorySourceProvider {
    fn load(&self, location: &str) -> Result<SharedSource, SourceError> {
        let sources = self.sources.read().map_err(|_| SourceError::ReadFailed {
            location: location.to_string(),
            message: "source store lock poisoned".to_string(),
        })?;
        sources
            .get(location)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(location.to_string()))
    }

    fn exists(&self, location: &str) -> bool {
        self.sources
            .read()
            .map(|s| s.contains_key(location))
            .unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "InMemorySourceProvider"
    }
}

/// Reads module texts from disk, relative locations against a root directory.
#[derive(Debug, Clone)]
pub struct FilesystemSourceProvider {
    root: PathBuf,
}

impl FilesystemSourceProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, location: &str) -> PathBuf {
        let location = location.strip_prefix("file://").unwrap_or(location);
        let path = Path::new(location);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl SourceProvider for FilesystemSourceProvider {
    fn load(&self, location: &str) -> Result<SharedSource, SourceError> {
        let path = self.path_for(location);
        log::debug!("reading module source {}", path.display());
        let bytes = std::fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SourceError::NotFound(location.to_string()),
            _ => SourceError::ReadFailed {
                location: location.to_string(),
                message: e.to_string(),
            },
        })?;
        let text = String::from_utf8(bytes)
            .map_err(|_| SourceError::InvalidEncoding(location.to_string()))?;
        Ok(text.into())
    }

    fn exists(&self, location: &str) -> bool {
        self.path_for(location).is_file()
    }

    fn name(&self) -> &'static str {
        "FilesystemSourceProvider"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_add_and_load() {
        let provider = InMemorySourceProvider::new();
        provider.add("lib.xq", "module namespace l = 'urn:l';").unwrap();
        assert_eq!(&*provider.load("lib.xq").unwrap(), "module namespace l = 'urn:l';");
        assert!(provider.exists("lib.xq"));
        assert_eq!(provider.len(), 1);
    }

    #[test]
    fn test_in_memory_not_found() {
        let provider = InMemorySourceProvider::new();
        assert!(matches!(provider.load("missing.xq"), Err(SourceError::NotFound(_))));
        assert!(provider.is_empty());
    }

    #[test]
    fn test_in_memory_overwrite_and_remove() {
        let provider = InMemorySourceProvider::new();
        provider.add("a.xq", "1").unwrap();
        provider.add("a.xq", "2").unwrap();
        assert_eq!(&*provider.load("a.xq").unwrap(), "2");
        assert_eq!(provider.remove("a.xq").as_deref(), Some("2"));
        assert!(provider.remove("a.xq").is_none());
    }

    #[test]
    fn test_filesystem_relative_and_absolute() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("lib")).unwrap();
        std::fs::write(dir.path().join("lib/m.xq"), "module namespace m = 'urn:m';").unwrap();
        let provider = FilesystemSourceProvider::new(dir.path());

        assert!(provider.exists("lib/m.xq"));
        assert!(provider.load("lib/m.xq").unwrap().starts_with("module"));

        let absolute = dir.path().join("lib/m.xq");
        let absolute = absolute.to_str().unwrap();
        assert!(provider.load(absolute).is_ok());
        assert!(provider.load(&format!("file://{}", absolute)).is_ok());
    }

    #[test]
    fn test_filesystem_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.xq"), [0xff, 0xfe, 0x00]).unwrap();
        let provider = FilesystemSourceProvider::new(dir.path());
        assert!(matches!(provider.load("nope.xq"), Err(SourceError::NotFound(_))));
        assert!(matches!(provider.load("bad.xq"), Err(SourceError::InvalidEncoding(_))));
    }

    #[test]
    fn test_error_display() {
        let err = SourceError::ReadFailed {
            location: "m.xq".to_string(),
            message: "permission denied".to_string(),
        };
        assert!(err.to_string().contains("m.xq"));
        assert!(err.to_string().contains("permission denied"));
    }
}
