//! Common utilities for integration tests

#![allow(dead_code)]

pub mod cli;

use crossbeam_channel::Receiver;
use gallery_core::{ChannelSink, GalleryEvent, MemoryStorage, Storage, StorageError};
use gallery_lib::system_config::StorageBackend;
use gallery_lib::{GalleryConfig, GalleryService, UploadOutcome};
use std::io::{Cursor, Write};
use std::sync::Arc;
use zip::write::SimpleFileOptions;

/// Build an in-memory zip; every entry is stamped 2024-03-15
pub fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored)
        .last_modified_time(zip::DateTime::from_date_and_time(2024, 3, 15, 10, 0, 0).unwrap());

    for (name, content) in entries {
        writer.start_file(name.to_string(), options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Memory-backed configuration with fast retries
pub fn test_config() -> GalleryConfig {
    let mut config = GalleryConfig::default();
    config.storage.backend = StorageBackend::Memory;
    config.upload.workers = 4;
    config.upload.base_backoff_ms = 0;
    config
}

/// Service wired to an inspectable storage and an event channel
pub struct Harness {
    pub service: GalleryService,
    pub storage: Arc<MemoryStorage>,
    pub events: Receiver<GalleryEvent>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: GalleryConfig) -> Self {
        Self::with_save_hook(config, |_| {})
    }

    /// Run `hook` with the key before every save
    pub fn with_save_hook(config: GalleryConfig, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        let storage = Arc::new(MemoryStorage::new());
        let hooked = HookedStorage {
            inner: storage.clone(),
            hook: Box::new(hook),
        };
        let (sink, events) = ChannelSink::new();
        let service = GalleryService::new(Arc::new(hooked), Arc::new(sink), &config).unwrap();
        Self {
            service,
            storage,
            events,
        }
    }

    /// Upload a zip built from `entries` and wait for the outcome
    pub fn upload(&self, gallery: &str, entries: &[(&str, &[u8])]) -> UploadOutcome {
        self.upload_bytes(gallery, build_zip(entries))
    }

    pub fn upload_bytes(&self, gallery: &str, data: Vec<u8>) -> UploadOutcome {
        self.service.submit_upload(gallery, data).unwrap().wait().unwrap()
    }

    /// Events published so far
    pub fn drain_events(&self) -> Vec<GalleryEvent> {
        self.events.try_iter().collect()
    }

    pub fn backup_count(&self, gallery: &str) -> usize {
        self.storage.list(&format!("backups/{gallery}")).unwrap().len()
    }
}

/// Memory storage that calls a hook before each save
struct HookedStorage {
    inner: Arc<MemoryStorage>,
    hook: Box<dyn Fn(&str) + Send + Sync>,
}

impl Storage for HookedStorage {
    fn save(&self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        (self.hook)(path);
        self.inner.save(path, data)
    }

    fn load(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.inner.load(path)
    }

    fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.inner.delete(path)
    }

    fn list(&self, directory: &str) -> Result<Vec<String>, StorageError> {
        self.inner.list(directory)
    }

    fn exists(&self, path: &str) -> bool {
        self.inner.exists(path)
    }
}
