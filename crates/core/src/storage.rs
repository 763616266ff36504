//! Storage port consumed by the gallery engines
//!
//! Keys are `/`-separated, case-sensitive strings such as
//! `holiday/gallery_data.json`. Backends decide how keys map onto bytes.

use dashmap::DashMap;
use std::path::PathBuf;

/// Errors surfaced by storage backends
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("I/O error on '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub fn io(key: &str, source: std::io::Error) -> Self {
        StorageError::Io {
            key: key.to_string(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

/// Byte-level file operations keyed by string paths
///
/// All calls are blocking. `delete` is idempotent and `list` returns an empty
/// list for a missing directory.
pub trait Storage: Send + Sync {
    /// Store `data` under `path`, replacing any previous content
    fn save(&self, path: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Load the bytes stored under `path`
    fn load(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Remove `path`; absence is not an error
    fn delete(&self, path: &str) -> Result<(), StorageError>;

    /// File names directly inside `directory` (not recursive)
    fn list(&self, directory: &str) -> Result<Vec<String>, StorageError>;

    /// Whether a file exists at `path`
    fn exists(&self, path: &str) -> bool;
}

/// In-process storage backend
///
/// Directories are implied by key prefixes, so listing `a` returns the last
/// segment of every key `a/<name>` without further slashes.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: DashMap<String, Vec<u8>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// All stored keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.files.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        keys
    }
}

impl Storage for MemoryStorage {
    fn save(&self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        let key = clean_key(path)?;
        self.files.insert(key, data.to_vec());
        Ok(())
    }

    fn load(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let key = clean_key(path)?;
        self.files
            .get(&key)
            .map(|entry| entry.value().clone())
            .ok_or(StorageError::NotFound(key))
    }

    fn delete(&self, path: &str) -> Result<(), StorageError> {
        let key = clean_key(path)?;
        self.files.remove(&key);
        Ok(())
    }

    fn list(&self, directory: &str) -> Result<Vec<String>, StorageError> {
        let prefix = match clean_key(directory)? {
            dir if dir.is_empty() => String::new(),
            dir => format!("{dir}/"),
        };
        let mut names: Vec<String> = self
            .files
            .iter()
            .filter_map(|entry| {
                let rest = entry.key().strip_prefix(prefix.as_str())?;
                (!rest.is_empty() && !rest.contains('/')).then(|| rest.to_string())
            })
            .collect();
        names.sort();
        Ok(names)
    }

    fn exists(&self, path: &str) -> bool {
        clean_key(path).map(|key| self.files.contains_key(&key)).unwrap_or(false)
    }
}

/// Normalize a storage key into a relative path
///
/// - Converts `\` to `/` and collapses empty and `.` segments
/// - Rejects `..` segments and absolute paths
pub fn normalize_key(key: &str) -> Result<PathBuf, StorageError> {
    Ok(PathBuf::from(clean_key(key)?))
}

pub(crate) fn clean_key(key: &str) -> Result<String, StorageError> {
    let unified = key.replace('\\', "/");
    if unified.starts_with('/') || unified.contains(':') {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    let mut segments = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(StorageError::InvalidKey(key.to_string())),
            other => segments.push(other),
        }
    }
    Ok(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_save_load_roundtrip() {
        let storage = MemoryStorage::new();
        storage.save("g/a.jpg", b"bytes").unwrap();
        assert_eq!(storage.load("g/a.jpg").unwrap(), b"bytes");
        assert!(storage.exists("g/a.jpg"));
        assert!(!storage.exists("g/b.jpg"));
    }

    #[test]
    fn test_memory_load_missing_is_not_found() {
        let storage = MemoryStorage::new();
        let err = storage.load("missing").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_memory_delete_is_idempotent() {
        let storage = MemoryStorage::new();
        storage.save("g/a.jpg", b"x").unwrap();
        storage.delete("g/a.jpg").unwrap();
        storage.delete("g/a.jpg").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_memory_list_is_not_recursive() {
        let storage = MemoryStorage::new();
        storage.save("backups/g/one.json", b"1").unwrap();
        storage.save("backups/g/two.json", b"2").unwrap();
        storage.save("backups/g/nested/three.json", b"3").unwrap();
        storage.save("backups/other/four.json", b"4").unwrap();

        assert_eq!(storage.list("backups/g").unwrap(), vec!["one.json", "two.json"]);
        assert!(storage.list("nothing/here").unwrap().is_empty());
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("./a//b/c.jpg").unwrap(), PathBuf::from("a/b/c.jpg"));
        assert_eq!(normalize_key("a\\b.jpg").unwrap(), PathBuf::from("a/b.jpg"));
        assert!(normalize_key("../etc/passwd").is_err());
        assert!(normalize_key("a/../../b").is_err());
        assert!(normalize_key("/abs/path").is_err());
        assert!(normalize_key("C:/windows").is_err());
    }
}
