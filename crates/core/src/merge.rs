//! Merging freshly ingested fragments into an existing gallery tree

use crate::tree::{GalleryTree, Node};
use ahash::{AHashMap, AHashSet};

/// Merge an ingested fragment into the existing tree
///
/// A missing or completely empty existing tree is replaced by the fragment.
/// Otherwise images are deduplicated by `full_path` (the existing entry wins,
/// keeping its status) and children are unioned by name, recursing into
/// folders present on both sides. The result is normalized.
pub fn merge_fragment(existing: Option<GalleryTree>, fragment: GalleryTree) -> GalleryTree {
    let mut merged = match existing {
        Some(mut tree) if !tree.is_empty() => {
            merge_into(&mut tree, fragment);
            tree
        }
        _ => fragment,
    };
    merged.normalize();
    merged
}

fn merge_into(existing: &mut Node, incoming: Node) {
    let mut known: AHashSet<String> = existing
        .images
        .iter()
        .map(|image| image.full_path.clone())
        .collect();
    for image in incoming.images {
        if known.insert(image.full_path.clone()) {
            existing.images.push(image);
        }
    }

    let mut by_name: AHashMap<String, usize> = existing
        .children
        .iter()
        .enumerate()
        .map(|(idx, child)| (child.name.clone(), idx))
        .collect();
    for child in incoming.children {
        match by_name.get(&child.name) {
            Some(&idx) => merge_into(&mut existing.children[idx], child),
            None => {
                by_name.insert(child.name.clone(), existing.children.len());
                existing.children.push(child);
            }
        }
    }
}
