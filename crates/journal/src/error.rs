//! Errors for gallery document operations

use gallery_core::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("malformed gallery document '{key}': {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode gallery '{gallery}': {source}")]
    Encode {
        gallery: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("gallery '{0}' has no document")]
    GalleryNotFound(String),

    #[error("no node at path '{0}'")]
    NodeNotFound(String),

    #[error("no images matched the given paths")]
    NoMatchingImages,

    #[error("backup '{0}' not found")]
    BackupNotFound(String),

    #[error("invalid backup name '{0}'")]
    InvalidBackupName(String),

    #[error("no paths selected")]
    EmptySelection,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for journal operations
pub type Result<T> = std::result::Result<T, JournalError>;
