//! Gallery Core - tree model and storage primitives for the photo gallery
//!
//! This crate provides the foundational layer:
//! - Gallery tree nodes, images and path addressing
//! - Deterministic hashed filenames for uploaded images
//! - Fragment merging
//! - The storage port with disk and in-memory backends
//! - Notification events emitted by the engines

pub mod events;
pub mod hash;
pub mod layout;
pub mod merge;
pub mod storage;
pub mod store;
pub mod tree;

// Re-export main types for convenience
pub use events::{ChannelSink, GalleryEvent, NotificationSink, NullSink};
pub use hash::hashed_filename;
pub use merge::merge_fragment;
pub use storage::{MemoryStorage, Storage, StorageError};
pub use store::LocalStorage;
pub use tree::{GalleryTree, Image, ImageStatus, Node, ParseStatusError, ROOT_NAME};
