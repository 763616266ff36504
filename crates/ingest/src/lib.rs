//! Zip ingestion for the photo gallery
//!
//! This crate turns an uploaded archive into a tree fragment:
//! - Image entries are filtered by extension and given hashed names
//! - Bodies are stored through the storage port on a bounded worker pool
//! - Failed uploads are retried with exponential backoff, then dropped
//! - Progress is published per settled file

pub mod archive;
pub mod progress;
pub mod upload;

pub use archive::{collect_images, PendingImage};
pub use progress::{Progress, ProgressTracker};
pub use upload::RetryPolicy;

use ahash::AHashSet;
use gallery_core::{GalleryEvent, GalleryTree, Image, Node, NotificationSink, Storage};
use parking_lot::Mutex;
use std::io::{Read, Seek};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Fatal ingestion failures
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("not a valid zip archive: {0}")]
    InvalidArchive(#[from] zip::result::ZipError),

    #[error("failed to read archive entry '{name}': {source}")]
    ReadEntry {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("archive contents exceed {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("failed to start upload workers: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Default cap on archive size and on the image bytes read from it
pub const DEFAULT_MAX_ARCHIVE_BYTES: u64 = 16 * 1024 * 1024;

/// Ingestion settings
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Upload worker threads
    pub workers: usize,
    pub max_archive_bytes: u64,
    pub retry: RetryPolicy,
    /// Accepted file extensions, compared case-insensitively
    pub allowed_extensions: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            workers: 8,
            max_archive_bytes: DEFAULT_MAX_ARCHIVE_BYTES,
            retry: RetryPolicy::default(),
            allowed_extensions: ["jpg", "jpeg", "png", "gif"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

/// Builds tree fragments from zip archives
pub struct Ingestor {
    storage: Arc<dyn Storage>,
    progress: Arc<ProgressTracker>,
    sink: Arc<dyn NotificationSink>,
    pool: rayon::ThreadPool,
    retry: RetryPolicy,
    allowed: AHashSet<String>,
    max_bytes: u64,
}

impl Ingestor {
    pub fn new(
        storage: Arc<dyn Storage>,
        progress: Arc<ProgressTracker>,
        sink: Arc<dyn NotificationSink>,
        config: &IngestConfig,
    ) -> Result<Self, IngestError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers.max(1))
            .thread_name(|i| format!("gallery-upload-{i}"))
            .build()?;

        Ok(Self {
            storage,
            progress,
            sink,
            pool,
            retry: config.retry.clone(),
            allowed: archive::extension_set(&config.allowed_extensions),
            max_bytes: config.max_archive_bytes,
        })
    }

    /// Shared progress tracker
    pub fn progress(&self) -> &Arc<ProgressTracker> {
        &self.progress
    }

    /// Ingest the archive in `reader` into a fresh fragment for `gallery`
    ///
    /// On success progress ends at 100 and a final progress event is
    /// published. On failure progress is set to -1; nothing is published.
    pub fn ingest<R: Read + Seek>(&self, gallery: &str, reader: R) -> Result<GalleryTree, IngestError> {
        self.progress.clear(gallery);

        match self.build_fragment(gallery, reader) {
            Ok(fragment) => {
                self.progress.set(gallery, 100.0);
                self.publish_progress(gallery, 100.0);
                info!(gallery, images = fragment.image_count(), "Ingested archive");
                Ok(fragment)
            }
            Err(e) => {
                error!(gallery, error = %e, "Error processing zip file");
                self.progress.fail(gallery);
                Err(e)
            }
        }
    }

    fn build_fragment<R: Read + Seek>(&self, gallery: &str, reader: R) -> Result<GalleryTree, IngestError> {
        let images = collect_images(reader, &self.allowed, self.max_bytes)?;
        if images.is_empty() {
            warn!(gallery, "No processable image files found in the archive");
            return Ok(Node::root());
        }

        let total = images.len();
        self.progress.set(gallery, 0.0);

        // Uploads settle out of order; tick under one lock so published
        // percentages never go backwards.
        let settled = Mutex::new(0usize);
        let uploaded = upload::upload_all(
            &self.pool,
            self.storage.as_ref(),
            gallery,
            images,
            &self.retry,
            || {
                let mut done = settled.lock();
                *done += 1;
                let percent = *done as f64 / total as f64 * 100.0;
                self.progress.set(gallery, percent);
                self.publish_progress(gallery, percent);
            },
        );

        if uploaded.len() < total {
            warn!(gallery, failed = total - uploaded.len(), total, "Some images could not be uploaded");
        }

        let mut fragment = Node::root();
        for image in uploaded {
            fragment
                .get_or_create_node(&image.folder)
                .add_image(Image::uploaded(image.hashed_filename, image.modification_date));
        }
        fragment.normalize();
        Ok(fragment)
    }

    fn publish_progress(&self, gallery: &str, progress: f64) {
        self.sink.publish(GalleryEvent::UploadProgress {
            gallery_name: gallery.to_string(),
            progress,
        });
    }
}
