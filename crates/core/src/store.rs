//! On-disk storage backend

use crate::storage::{normalize_key, Storage, StorageError};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Storage rooted at a base directory on the local filesystem
///
/// Layout produced by the gallery engines:
/// ```text
/// <base>/
///   <gallery>/
///     gallery_data.json
///     <hashed image files>
///   backups/
///     <gallery>/
///       gallery_data_<YYYYMMDDHHMMSS>.json
/// ```
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base: PathBuf,
}

impl LocalStorage {
    /// Open (and create if needed) a store at `base`
    pub fn open(base: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base = base.into();
        fs::create_dir_all(&base)
            .map_err(|e| StorageError::io(&base.display().to_string(), e))?;
        Ok(Self { base })
    }

    /// Get the base directory
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Resolve a storage key to a path under the base directory
    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        Ok(self.base.join(normalize_key(key)?))
    }
}

impl Storage for LocalStorage {
    fn save(&self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        let target = self.resolve(path)?;
        atomic_write(&target, data).map_err(|e| StorageError::io(path, e))
    }

    fn load(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let target = self.resolve(path)?;
        match fs::read(&target) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(path.to_string())),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }

    fn delete(&self, path: &str) -> Result<(), StorageError> {
        let target = self.resolve(path)?;
        if !target.is_file() {
            return Ok(());
        }
        match fs::remove_file(&target) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }

    fn list(&self, directory: &str) -> Result<Vec<String>, StorageError> {
        let dir = self.resolve(directory)?;
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| StorageError::io(directory, e))? {
            let entry = entry.map_err(|e| StorageError::io(directory, e))?;
            let file_type = entry.file_type().map_err(|e| StorageError::io(directory, e))?;
            if file_type.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.is_file()).unwrap_or(false)
    }
}

/// Atomic write helper
///
/// Writes data to a temporary file next to the target, fsyncs it, then
/// renames it over the target path. Parent directories are created.
pub fn atomic_write(target: &Path, data: &[u8]) -> std::io::Result<()> {
    let parent = target
        .parent()
        .ok_or_else(|| std::io::Error::new(ErrorKind::InvalidInput, "target has no parent"))?;
    fs::create_dir_all(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, LocalStorage) {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::open(temp_dir.path().join("gallery_data")).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_open_creates_base() {
        let (_temp, storage) = open_temp();
        assert!(storage.base().is_dir());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let (_temp, storage) = open_temp();
        storage.save("holiday/a.jpg", b"jpeg bytes").unwrap();
        assert_eq!(storage.load("holiday/a.jpg").unwrap(), b"jpeg bytes");
        assert!(storage.base().join("holiday/a.jpg").is_file());

        storage.save("holiday/a.jpg", b"replaced").unwrap();
        assert_eq!(storage.load("holiday/a.jpg").unwrap(), b"replaced");
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let (_temp, storage) = open_temp();
        assert!(storage.load("nope/gallery_data.json").unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (_temp, storage) = open_temp();
        storage.save("g/x.png", b"x").unwrap();
        assert!(storage.exists("g/x.png"));
        storage.delete("g/x.png").unwrap();
        storage.delete("g/x.png").unwrap();
        assert!(!storage.exists("g/x.png"));
    }

    #[test]
    fn test_list_files_only() {
        let (_temp, storage) = open_temp();
        storage.save("backups/g/b.json", b"2").unwrap();
        storage.save("backups/g/a.json", b"1").unwrap();
        storage.save("backups/g/sub/c.json", b"3").unwrap();

        assert_eq!(storage.list("backups/g").unwrap(), vec!["a.json", "b.json"]);
        assert!(storage.list("backups/missing").unwrap().is_empty());
    }

    #[test]
    fn test_rejects_escaping_keys() {
        let (_temp, storage) = open_temp();
        assert!(matches!(
            storage.save("../outside.txt", b"x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(!storage.exists("../outside.txt"));
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("nested/dir/file.bin");
        atomic_write(&target, b"content").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"content");
        let entries: Vec<_> = fs::read_dir(target.parent().unwrap()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
