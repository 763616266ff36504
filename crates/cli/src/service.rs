//! Gallery service: upload queue, mutations and event fan-out
//!
//! Uploads are accepted immediately and processed one at a time on a queue
//! worker thread. Each job ingests the archive, merges the fragment into the
//! persisted tree and publishes the outcome to the notification sink.

use crate::system_config::{GalleryConfig, StorageBackend};
use anyhow::{anyhow, bail, Context, Result};
use bytes::Bytes;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use gallery_core::layout::BACKUP_ROOT;
use gallery_core::{
    GalleryEvent, GalleryTree, ImageStatus, LocalStorage, MemoryStorage, NotificationSink, Storage,
};
use ingest::{Ingestor, Progress, ProgressTracker};
use journal::{BackupEntry, GalleryJournal};
use std::any::Any;
use std::io::Cursor;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error, info};

/// Result of one upload job
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// The merged tree as persisted
    Completed(GalleryTree),
    Failed { gallery: String, reason: String },
}

/// Handle to a submitted upload
#[derive(Debug)]
pub struct UploadTicket {
    gallery: String,
    rx: Receiver<UploadOutcome>,
}

impl UploadTicket {
    pub fn gallery(&self) -> &str {
        &self.gallery
    }

    /// Block until the job finishes
    pub fn wait(self) -> Result<UploadOutcome> {
        self.rx
            .recv()
            .map_err(|_| anyhow!("Upload worker stopped before finishing '{}'", self.gallery))
    }

    /// Block for at most `timeout`; `None` if the job is still running
    pub fn wait_timeout(&self, timeout: Duration) -> Result<Option<UploadOutcome>> {
        match self.rx.recv_timeout(timeout) {
            Ok(outcome) => Ok(Some(outcome)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                bail!("Upload worker stopped before finishing '{}'", self.gallery)
            }
        }
    }
}

struct UploadJob {
    gallery: String,
    archive: Bytes,
    reply: Sender<UploadOutcome>,
}

/// Engines shared by the service and its queue worker
struct Engines {
    journal: GalleryJournal,
    ingestor: Ingestor,
    sink: Arc<dyn NotificationSink>,
}

impl Engines {
    fn process_upload(&self, gallery: &str, archive: Bytes) -> UploadOutcome {
        match self.ingest_and_merge(gallery, archive) {
            Ok(tree) => {
                self.publish_updated(gallery, &tree);
                UploadOutcome::Completed(tree)
            }
            Err(e) => self.fail_upload(gallery, format!("{e:#}")),
        }
    }

    fn fail_upload(&self, gallery: &str, reason: String) -> UploadOutcome {
        error!(gallery, error = %reason, "Upload failed");
        self.ingestor.progress().fail(gallery);
        self.sink.publish(GalleryEvent::UploadFailed {
            gallery_name: gallery.to_string(),
        });
        UploadOutcome::Failed {
            gallery: gallery.to_string(),
            reason,
        }
    }

    fn ingest_and_merge(&self, gallery: &str, archive: Bytes) -> Result<GalleryTree> {
        let fragment = self
            .ingestor
            .ingest(gallery, Cursor::new(archive))
            .context("Failed to process archive")?;

        if fragment.is_empty() {
            debug!(gallery, "Nothing ingested, leaving gallery unchanged");
            return self.journal.read(gallery).context("Failed to read gallery");
        }
        self.journal
            .merge_fragment(gallery, fragment)
            .context("Failed to merge uploaded images")
    }

    fn publish_updated(&self, gallery: &str, tree: &GalleryTree) {
        self.sink.publish(GalleryEvent::GalleryUpdated {
            gallery_name: gallery.to_string(),
            gallery_data: tree.clone(),
        });
    }
}

/// Single-worker job queue for uploads
struct UploadQueue {
    tx: Option<Sender<UploadJob>>,
    worker: Option<JoinHandle<()>>,
}

impl UploadQueue {
    fn start(engines: Arc<Engines>) -> Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded::<UploadJob>();
        let worker = std::thread::Builder::new()
            .name("gallery-upload-queue".to_string())
            .spawn(move || {
                for UploadJob { gallery, archive, reply } in rx.iter() {
                    info!(gallery = %gallery, bytes = archive.len(), "Processing upload");
                    // A panicking job must not take the worker down with it
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                        engines.process_upload(&gallery, archive)
                    }))
                    .unwrap_or_else(|payload| {
                        let reason = format!("upload job panicked: {}", panic_message(payload.as_ref()));
                        engines.fail_upload(&gallery, reason)
                    });
                    // The submitter may have dropped its ticket
                    let _ = reply.send(outcome);
                }
                debug!("Upload queue drained");
            })
            .context("Failed to spawn upload worker")?;

        Ok(Self {
            tx: Some(tx),
            worker: Some(worker),
        })
    }

    fn submit(&self, job: UploadJob) -> Result<()> {
        let tx = self.tx.as_ref().context("Upload queue is shut down")?;
        tx.send(job).map_err(|_| anyhow!("Upload queue is shut down"))
    }

    /// Close the queue and wait for queued jobs to finish
    fn shutdown(&mut self) {
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("Upload worker panicked");
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

/// Entry point for every gallery operation
pub struct GalleryService {
    engines: Arc<Engines>,
    progress: Arc<ProgressTracker>,
    queue: UploadQueue,
    max_archive_bytes: u64,
}

impl GalleryService {
    pub fn new(
        storage: Arc<dyn Storage>,
        sink: Arc<dyn NotificationSink>,
        config: &GalleryConfig,
    ) -> Result<Self> {
        let progress = Arc::new(ProgressTracker::new());
        let ingestor = Ingestor::new(
            storage.clone(),
            progress.clone(),
            sink.clone(),
            &config.ingest_config(),
        )
        .context("Failed to create ingestor")?;
        let journal = GalleryJournal::new(storage, config.versioning_config());

        let engines = Arc::new(Engines {
            journal,
            ingestor,
            sink,
        });
        let queue = UploadQueue::start(engines.clone())?;

        Ok(Self {
            engines,
            progress,
            queue,
            max_archive_bytes: config.upload.max_archive_bytes,
        })
    }

    /// Build the service with the storage backend named in `config`
    pub fn from_config(config: &GalleryConfig, sink: Arc<dyn NotificationSink>) -> Result<Self> {
        Self::new(open_storage(config)?, sink, config)
    }

    /// Queue an archive for ingestion into `gallery`
    ///
    /// Returns as soon as the job is queued. Progress of `gallery` reads as
    /// unset until the job starts.
    pub fn submit_upload(&self, gallery: &str, archive: impl Into<Bytes>) -> Result<UploadTicket> {
        validate_gallery_name(gallery)?;
        let archive = archive.into();
        if archive.len() as u64 > self.max_archive_bytes {
            bail!(
                "Archive of {} bytes exceeds the {} byte upload limit",
                archive.len(),
                self.max_archive_bytes
            );
        }

        let (reply, rx) = crossbeam_channel::bounded(1);
        self.progress.clear(gallery);
        self.queue.submit(UploadJob {
            gallery: gallery.to_string(),
            archive,
            reply,
        })?;
        info!(gallery, "Upload accepted");
        Ok(UploadTicket {
            gallery: gallery.to_string(),
            rx,
        })
    }

    /// Latest ingestion progress of `gallery`
    pub fn upload_progress(&self, gallery: &str) -> Option<Progress> {
        self.progress.get(gallery)
    }

    /// Current tree of `gallery`; empty root if it has no document yet
    pub fn gallery(&self, gallery: &str) -> Result<GalleryTree> {
        validate_gallery_name(gallery)?;
        self.engines
            .journal
            .read(gallery)
            .with_context(|| format!("Failed to read gallery '{gallery}'"))
    }

    pub fn set_comment(&self, gallery: &str, path: &str, comment: &str) -> Result<GalleryTree> {
        validate_gallery_name(gallery)?;
        let tree = self
            .engines
            .journal
            .update_comment(gallery, path, comment)
            .with_context(|| format!("Failed to update comment in '{gallery}'"))?;
        self.engines.publish_updated(gallery, &tree);
        Ok(tree)
    }

    /// Set the status of images by path; `status` must be good, bad or neutral
    pub fn set_image_status(&self, gallery: &str, paths: &[String], status: &str) -> Result<GalleryTree> {
        validate_gallery_name(gallery)?;
        let status: ImageStatus = status.parse()?;
        let tree = self
            .engines
            .journal
            .update_image_status(gallery, paths, status)
            .with_context(|| format!("Failed to update image status in '{gallery}'"))?;
        self.engines.publish_updated(gallery, &tree);
        Ok(tree)
    }

    pub fn delete_items(&self, gallery: &str, paths: &[String]) -> Result<GalleryTree> {
        validate_gallery_name(gallery)?;
        let tree = self
            .engines
            .journal
            .delete_items(gallery, paths)
            .with_context(|| format!("Failed to delete items from '{gallery}'"))?;
        self.engines.publish_updated(gallery, &tree);
        Ok(tree)
    }

    /// Snapshots of `gallery`, newest first
    pub fn versions(&self, gallery: &str) -> Result<Vec<BackupEntry>> {
        validate_gallery_name(gallery)?;
        self.engines
            .journal
            .list_backups(gallery)
            .with_context(|| format!("Failed to list versions of '{gallery}'"))
    }

    pub fn version(&self, gallery: &str, filename: &str) -> Result<Option<GalleryTree>> {
        validate_gallery_name(gallery)?;
        self.engines
            .journal
            .read_backup(gallery, filename)
            .with_context(|| format!("Failed to read version '{filename}' of '{gallery}'"))
    }

    pub fn revert(&self, gallery: &str, filename: &str) -> Result<GalleryTree> {
        validate_gallery_name(gallery)?;
        let tree = self
            .engines
            .journal
            .revert_to_version(gallery, filename)
            .with_context(|| format!("Failed to revert '{gallery}' to '{filename}'"))?;
        self.engines.publish_updated(gallery, &tree);
        Ok(tree)
    }

    /// Stop accepting uploads and wait for queued ones to finish
    pub fn shutdown(&mut self) {
        self.queue.shutdown();
    }
}

impl Drop for GalleryService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Open the storage backend configured in `config`
pub fn open_storage(config: &GalleryConfig) -> Result<Arc<dyn Storage>> {
    let storage: Arc<dyn Storage> = match config.storage.backend {
        StorageBackend::Local => {
            let base = &config.storage.base_directory;
            Arc::new(
                LocalStorage::open(base)
                    .with_context(|| format!("Failed to open storage at {}", base.display()))?,
            )
        }
        StorageBackend::Memory => Arc::new(MemoryStorage::new()),
    };
    Ok(storage)
}

/// Gallery names are single path segments outside the backup namespace
pub fn validate_gallery_name(gallery: &str) -> Result<()> {
    if gallery.is_empty()
        || gallery == "."
        || gallery == ".."
        || gallery == BACKUP_ROOT
        || gallery.contains(['/', '\\', ':'])
    {
        bail!("Invalid gallery name '{gallery}'");
    }
    Ok(())
}
