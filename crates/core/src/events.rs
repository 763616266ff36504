//! Notification events published by the gallery engines

use crate::tree::GalleryTree;
use crossbeam_channel::{Receiver, Sender};
use serde::Serialize;

/// Event pushed to clients while uploads run and after mutations
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum GalleryEvent {
    /// Ingestion progress in percent (0..=100)
    UploadProgress { gallery_name: String, progress: f64 },
    /// A mutation completed; carries the new tree
    GalleryUpdated {
        gallery_name: String,
        gallery_data: GalleryTree,
    },
    /// Ingestion failed fatally
    UploadFailed { gallery_name: String },
}

impl GalleryEvent {
    pub fn gallery_name(&self) -> &str {
        match self {
            GalleryEvent::UploadProgress { gallery_name, .. }
            | GalleryEvent::GalleryUpdated { gallery_name, .. }
            | GalleryEvent::UploadFailed { gallery_name } => gallery_name,
        }
    }
}

/// Receiver of gallery events
pub trait NotificationSink: Send + Sync {
    fn publish(&self, event: GalleryEvent);
}

/// Sink that discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn publish(&self, _event: GalleryEvent) {}
}

/// Sink forwarding events into an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<GalleryEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiving end of its channel
    pub fn new() -> (Self, Receiver<GalleryEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn publish(&self, event: GalleryEvent) {
        // Receiver gone means nobody is listening any more
        if self.tx.send(event).is_err() {
            tracing::trace!("Dropping gallery event, receiver disconnected");
        }
    }
}
