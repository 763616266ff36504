//! Gallery document versioning and mutation
//!
//! This crate provides:
//! - Reading and writing gallery documents through the storage port
//! - Automatic timestamped snapshots before every overwrite
//! - Snapshot listing, inspection and revert
//! - Comment, status and deletion mutations
//! - Per-gallery write locks

pub mod backup;
pub mod error;
pub mod journal;
pub mod locks;
pub mod prune;

// Re-exports
pub use backup::BackupEntry;
pub use error::{JournalError, Result};
pub use journal::{GalleryJournal, VersioningConfig};
pub use locks::GalleryLocks;
pub use prune::{collect_image_keys, prune_tree};
