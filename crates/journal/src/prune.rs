//! Deleting images and folders from a gallery

use crate::error::{JournalError, Result};
use crate::journal::GalleryJournal;
use ahash::AHashSet;
use gallery_core::layout::image_key;
use gallery_core::{GalleryTree, Node};
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Storage file names of every image selected by `targets`
///
/// An image is selected when its own `full_path` is a target or when any
/// enclosing folder's `full_path` is. The root (empty path) never selects
/// its contents.
pub fn collect_image_keys(node: &Node, targets: &AHashSet<&str>) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();
    collect_into(node, targets, false, &mut keys);
    keys
}

fn collect_into(node: &Node, targets: &AHashSet<&str>, inherited: bool, keys: &mut BTreeSet<String>) {
    let selected = inherited || (!node.full_path.is_empty() && targets.contains(node.full_path.as_str()));
    for image in &node.images {
        if selected || targets.contains(image.full_path.as_str()) {
            keys.insert(image.filename.clone());
        }
    }
    for child in &node.children {
        collect_into(child, targets, selected, keys);
    }
}

/// Remove targeted images and folders from `node`
///
/// Folders left without images or children afterwards are dropped as well.
/// The node itself is always kept.
pub fn prune_tree(mut node: Node, targets: &AHashSet<&str>) -> Node {
    node.images
        .retain(|image| !targets.contains(image.full_path.as_str()));
    node.children = std::mem::take(&mut node.children)
        .into_iter()
        .filter(|child| !targets.contains(child.full_path.as_str()))
        .map(|child| prune_tree(child, targets))
        .filter(|child| !child.is_empty())
        .collect();
    node
}

impl GalleryJournal {
    /// Delete images and folders addressed by `paths` from `gallery`
    ///
    /// Image bodies are removed from storage on a best-effort basis; a failed
    /// delete is logged and does not stop the document update.
    pub fn delete_items(&self, gallery: &str, paths: &[String]) -> Result<GalleryTree> {
        if paths.is_empty() {
            return Err(JournalError::EmptySelection);
        }
        let targets: AHashSet<&str> = paths
            .iter()
            .map(String::as_str)
            .filter(|path| !path.is_empty())
            .collect();

        self.locks().with_lock(gallery, || {
            if !self.exists(gallery) {
                warn!(gallery, "Delete requested for gallery without data");
                return Err(JournalError::GalleryNotFound(gallery.to_string()));
            }
            let tree = self.read(gallery)?;

            let keys = collect_image_keys(&tree, &targets);
            for filename in &keys {
                let key = image_key(gallery, filename);
                match self.storage().delete(&key) {
                    Ok(()) => info!(gallery, key = %key, "Deleted image"),
                    Err(e) => warn!(gallery, key = %key, error = %e, "Failed to delete image"),
                }
            }

            let mut pruned = prune_tree(tree, &targets);
            pruned.normalize();
            self.write(gallery, &pruned)?;
            info!(gallery, deleted = keys.len(), "Deleted items");
            Ok(pruned)
        })
    }
}
