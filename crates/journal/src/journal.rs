//! Versioned gallery documents on top of the storage port

use crate::backup::BackupEntry;
use crate::error::{JournalError, Result};
use crate::locks::GalleryLocks;
use ahash::AHashSet;
use gallery_core::layout::{backup_dir, backup_key, document_key};
use gallery_core::{merge_fragment, GalleryTree, ImageStatus, Node, Storage};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Versioning behaviour
#[derive(Debug, Clone, Default)]
pub struct VersioningConfig {
    /// Snapshot the current document before reverting to an older one
    pub snapshot_on_revert: bool,
}

/// Reads, writes and versions gallery documents
///
/// Every write that replaces an existing document first copies it to the
/// gallery's backup namespace. Read-modify-write operations hold the
/// gallery's lock for their whole duration.
pub struct GalleryJournal {
    storage: Arc<dyn Storage>,
    locks: GalleryLocks,
    config: VersioningConfig,
}

impl GalleryJournal {
    pub fn new(storage: Arc<dyn Storage>, config: VersioningConfig) -> Self {
        Self {
            storage,
            locks: GalleryLocks::new(),
            config,
        }
    }

    /// Get the storage backend
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Get the per-gallery locks
    pub fn locks(&self) -> &GalleryLocks {
        &self.locks
    }

    /// Whether `gallery` has a persisted document
    pub fn exists(&self, gallery: &str) -> bool {
        self.storage.exists(&document_key(gallery))
    }

    /// Load the current tree of `gallery`
    ///
    /// A gallery without a document reads as an empty root. The returned tree
    /// always has statuses filled in and is normalized.
    pub fn read(&self, gallery: &str) -> Result<GalleryTree> {
        let key = document_key(gallery);
        match self.storage.load(&key) {
            Ok(bytes) => decode(&key, &bytes),
            Err(e) if e.is_not_found() => Ok(Node::root()),
            Err(e) => {
                error!(gallery, key = %key, error = %e, "Failed to load gallery data");
                Err(e.into())
            }
        }
    }

    /// Persist `tree` as the current document of `gallery`
    ///
    /// The previous document, if any, is snapshotted first. A failed snapshot
    /// is logged and does not prevent the write.
    pub fn write(&self, gallery: &str, tree: &GalleryTree) -> Result<()> {
        let mut canonical = tree.clone();
        canonical.normalize();
        let bytes = encode(gallery, &canonical)?;

        if let Err(e) = self.snapshot(gallery) {
            error!(gallery, error = %e, "Failed to create backup, writing anyway");
        }

        let key = document_key(gallery);
        self.storage.save(&key, &bytes).map_err(|e| {
            error!(gallery, key = %key, error = %e, "Failed to write gallery data");
            e
        })?;
        info!(gallery, key = %key, "Wrote gallery data");
        Ok(())
    }

    /// Copy the current document of `gallery` into its backup namespace
    ///
    /// Returns `None` when there is no document to back up.
    pub fn snapshot(&self, gallery: &str) -> Result<Option<BackupEntry>> {
        let key = document_key(gallery);
        if !self.storage.exists(&key) {
            return Ok(None);
        }

        let entry = BackupEntry::now();
        let data = self.storage.load(&key)?;
        let target = backup_key(gallery, &entry.filename);
        if self.storage.exists(&target) {
            // Names have second precision; the earlier snapshot is lost
            warn!(gallery, backup = %target, "Overwriting backup taken in the same second");
        }
        self.storage.save(&target, &data)?;
        info!(gallery, backup = %target, "Created backup");
        Ok(Some(entry))
    }

    /// Read, modify and write `gallery` under its lock
    ///
    /// If `f` fails nothing is written. Returns the tree as persisted.
    pub fn mutate<F>(&self, gallery: &str, f: F) -> Result<GalleryTree>
    where
        F: FnOnce(&mut GalleryTree) -> Result<()>,
    {
        self.locks.with_lock(gallery, || {
            let mut tree = self.read(gallery)?;
            f(&mut tree)?;
            self.write(gallery, &tree)?;
            tree.normalize();
            Ok(tree)
        })
    }

    /// Set the comment of the node at `path`
    pub fn update_comment(&self, gallery: &str, path: &str, comment: &str) -> Result<GalleryTree> {
        self.mutate(gallery, |tree| {
            let node = tree.find_node_by_path_mut(path).ok_or_else(|| {
                error!(gallery, path, "Node not found for comment update");
                JournalError::NodeNotFound(path.to_string())
            })?;
            node.comment = comment.to_string();
            Ok(())
        })
    }

    /// Set `status` on every image whose `full_path` is in `image_paths`
    ///
    /// Fails without writing when no image matched.
    pub fn update_image_status(
        &self,
        gallery: &str,
        image_paths: &[String],
        status: ImageStatus,
    ) -> Result<GalleryTree> {
        let targets: AHashSet<&str> = image_paths.iter().map(String::as_str).collect();
        self.mutate(gallery, |tree| {
            let mut updated = 0usize;
            tree.for_each_image_mut(&mut |image| {
                if targets.contains(image.full_path.as_str()) {
                    image.status = Some(status);
                    updated += 1;
                }
            });

            if updated == 0 {
                warn!(gallery, "No images matched the provided paths for status update");
                return Err(JournalError::NoMatchingImages);
            }
            info!(gallery, updated, status = %status, "Updated image status");
            Ok(())
        })
    }

    /// Merge an ingested fragment into `gallery` and persist the result
    pub fn merge_fragment(&self, gallery: &str, fragment: GalleryTree) -> Result<GalleryTree> {
        self.locks.with_lock(gallery, || {
            let existing = self.read(gallery)?;
            let merged = merge_fragment(Some(existing), fragment);
            self.write(gallery, &merged)?;
            Ok(merged)
        })
    }

    /// Snapshots of `gallery`, newest first
    ///
    /// Files that look like snapshots but carry an unparsable timestamp are
    /// skipped.
    pub fn list_backups(&self, gallery: &str) -> Result<Vec<BackupEntry>> {
        let names = self.storage.list(&backup_dir(gallery))?;
        let mut backups: Vec<BackupEntry> = names
            .iter()
            .filter(|name| BackupEntry::has_snapshot_shape(name))
            .filter_map(|name| {
                let entry = BackupEntry::parse(name);
                if entry.is_none() {
                    warn!(gallery, file = %name, "Could not parse timestamp from backup file");
                }
                entry
            })
            .collect();
        backups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(backups)
    }

    /// Load one snapshot by file name, `None` if it does not exist
    pub fn read_backup(&self, gallery: &str, filename: &str) -> Result<Option<GalleryTree>> {
        let entry = parse_backup_name(filename)?;
        let key = backup_key(gallery, &entry.filename);
        match self.storage.load(&key) {
            Ok(bytes) => decode(&key, &bytes).map(Some),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Make snapshot `filename` the current document of `gallery`
    ///
    /// The snapshot must decode as a gallery tree. The document being
    /// replaced is only snapshotted when `snapshot_on_revert` is set.
    pub fn revert_to_version(&self, gallery: &str, filename: &str) -> Result<GalleryTree> {
        let entry = parse_backup_name(filename)?;
        self.locks.with_lock(gallery, || {
            let key = backup_key(gallery, &entry.filename);
            let bytes = match self.storage.load(&key) {
                Ok(bytes) => bytes,
                Err(e) if e.is_not_found() => {
                    warn!(gallery, file = %entry.filename, "Backup file not found for reversion");
                    return Err(JournalError::BackupNotFound(entry.filename.clone()));
                }
                Err(e) => return Err(e.into()),
            };
            let tree = decode(&key, &bytes)?;

            if self.config.snapshot_on_revert {
                if let Err(e) = self.snapshot(gallery) {
                    error!(gallery, error = %e, "Failed to create backup before revert");
                }
            }

            self.storage.save(&document_key(gallery), &bytes)?;
            info!(gallery, version = %entry.filename, "Reverted gallery data");
            Ok(tree)
        })
    }
}

fn parse_backup_name(filename: &str) -> Result<BackupEntry> {
    BackupEntry::parse(filename).ok_or_else(|| JournalError::InvalidBackupName(filename.to_string()))
}

fn decode(key: &str, bytes: &[u8]) -> Result<GalleryTree> {
    let mut tree: GalleryTree = serde_json::from_slice(bytes).map_err(|source| {
        error!(key, error = %source, "Error decoding gallery JSON");
        JournalError::Malformed {
            key: key.to_string(),
            source,
        }
    })?;
    tree.ensure_image_status();
    tree.normalize();
    Ok(tree)
}

fn encode(gallery: &str, tree: &GalleryTree) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    tree.serialize(&mut serializer)
        .map_err(|source| JournalError::Encode {
            gallery: gallery.to_string(),
            source,
        })?;
    Ok(buf)
}
