//! Tree representation for gallery documents
//!
//! A gallery is a rooted, ordered n-ary tree. Folder nodes carry a comment,
//! a list of images and child folders. The root is named [`ROOT_NAME`] and has
//! no meaningful `full_path`; every other node's `full_path` is the
//! `/`-joined chain of ancestor names below the root.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the sentinel root node
pub const ROOT_NAME: &str = "root";

/// Curation status of an image
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStatus {
    Good,
    Bad,
    #[default]
    Neutral,
}

impl ImageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageStatus::Good => "good",
            ImageStatus::Bad => "bad",
            ImageStatus::Neutral => "neutral",
        }
    }
}

impl fmt::Display for ImageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a status string is not one of `good`, `bad`, `neutral`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid image status '{0}', expected one of: good, bad, neutral")]
pub struct ParseStatusError(pub String);

impl FromStr for ImageStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "good" => Ok(ImageStatus::Good),
            "bad" => Ok(ImageStatus::Bad),
            "neutral" => Ok(ImageStatus::Neutral),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// An uploaded image inside a folder node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Hashed filename, also the storage key below the gallery namespace
    pub filename: String,
    /// Modification date taken from the archive entry (`YYYY-MM-DD`)
    #[serde(default)]
    pub modification_date: String,
    /// Missing in documents written before curation existed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ImageStatus>,
    #[serde(default)]
    pub full_path: String,
}

impl Image {
    /// Create a freshly uploaded image (neutral, `full_path == filename`)
    pub fn uploaded(filename: impl Into<String>, modification_date: impl Into<String>) -> Self {
        let filename = filename.into();
        Self {
            full_path: filename.clone(),
            filename,
            modification_date: modification_date.into(),
            status: Some(ImageStatus::Neutral),
        }
    }

    /// Effective status, treating a missing value as neutral
    pub fn status(&self) -> ImageStatus {
        self.status.unwrap_or_default()
    }
}

/// A folder in the gallery tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub full_path: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub comment: String,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub children: Vec<Node>,
}

/// A whole gallery document is its root node
pub type GalleryTree = Node;

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Node {
    /// Create an empty root node
    pub fn root() -> Self {
        Self::folder(ROOT_NAME, "")
    }

    /// Create an empty folder node
    pub fn folder(name: impl Into<String>, full_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_path: full_path.into(),
            comment: String::new(),
            images: Vec::new(),
            children: Vec::new(),
        }
    }

    /// A node is empty when it has neither images nor children
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.children.is_empty()
    }

    /// Total number of images in this subtree
    pub fn image_count(&self) -> usize {
        self.images.len() + self.children.iter().map(Node::image_count).sum::<usize>()
    }

    /// Find a node by its `/`-separated path of child names
    ///
    /// The empty path addresses the node itself. Segments must match child
    /// names exactly; any unmatched segment yields `None`.
    pub fn find_node_by_path(&self, path: &str) -> Option<&Node> {
        if path.is_empty() {
            return Some(self);
        }
        let mut node = self;
        for segment in path.split('/') {
            node = node.children.iter().find(|child| child.name == segment)?;
        }
        Some(node)
    }

    /// Mutable variant of [`Node::find_node_by_path`]
    pub fn find_node_by_path_mut(&mut self, path: &str) -> Option<&mut Node> {
        if path.is_empty() {
            return Some(self);
        }
        let mut node = self;
        for segment in path.split('/') {
            node = node.children.iter_mut().find(|child| child.name == segment)?;
        }
        Some(node)
    }

    /// Walk the folder chain for `path`, creating missing nodes
    ///
    /// Empty and `.` segments are skipped. When the first segment equals this
    /// node's own name (an archive wrapped in a folder called `root`) it is
    /// dropped. Created nodes get the cumulative joined path as `full_path`.
    pub fn get_or_create_node(&mut self, path: &str) -> &mut Node {
        let mut segments: Vec<&str> = path
            .split('/')
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .collect();
        if segments.first().copied() == Some(self.name.as_str()) {
            segments.remove(0);
        }

        let mut node = self;
        let mut full_path = String::new();
        for segment in segments {
            if !full_path.is_empty() {
                full_path.push('/');
            }
            full_path.push_str(segment);

            let idx = match node.children.iter().position(|child| child.name == segment) {
                Some(idx) => idx,
                None => {
                    node.children.push(Node::folder(segment, full_path.as_str()));
                    node.children.len() - 1
                }
            };
            node = &mut node.children[idx];
        }
        node
    }

    /// Add an image unless one with the same filename is already present
    ///
    /// Returns `false` when the image was a duplicate.
    pub fn add_image(&mut self, image: Image) -> bool {
        if self.images.iter().any(|existing| existing.filename == image.filename) {
            return false;
        }
        self.images.push(image);
        true
    }

    /// Sort images by filename and children by name, case-insensitively, recursively
    ///
    /// Sorting is stable, so entries that compare equal ignoring case keep
    /// their relative order. Idempotent.
    pub fn normalize(&mut self) {
        self.images.sort_by_cached_key(|image| image.filename.to_lowercase());
        self.children.sort_by_cached_key(|child| child.name.to_lowercase());
        for child in &mut self.children {
            child.normalize();
        }
    }

    /// Default any missing image status to neutral, recursively. Idempotent.
    pub fn ensure_image_status(&mut self) {
        for image in &mut self.images {
            if image.status.is_none() {
                image.status = Some(ImageStatus::Neutral);
            }
        }
        for child in &mut self.children {
            child.ensure_image_status();
        }
    }

    /// Visit every image in the subtree mutably
    pub fn for_each_image_mut(&mut self, f: &mut impl FnMut(&mut Image)) {
        for image in &mut self.images {
            f(image);
        }
        for child in &mut self.children {
            child.for_each_image_mut(f);
        }
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::root()
    }
}
