//! Process-wide upload progress keyed by gallery name

use ahash::AHashMap;
use parking_lot::Mutex;
use serde::{Serialize, Serializer};

/// Progress of the latest ingestion of one gallery
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    /// Percentage of files processed, 0..=100
    Percent(f64),
    /// The ingestion failed fatally
    Failed,
}

impl Progress {
    /// Wire value reported to pollers: the percentage, or -1 on failure
    pub fn value(&self) -> f64 {
        match self {
            Progress::Percent(pct) => *pct,
            Progress::Failed => -1.0,
        }
    }

    /// Whether the ingestion reached 100% or failed
    pub fn is_terminal(&self) -> bool {
        match self {
            Progress::Percent(pct) => *pct >= 100.0,
            Progress::Failed => true,
        }
    }
}

impl Serialize for Progress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.value())
    }
}

/// Shared mapping from gallery name to its latest progress
///
/// Entries are cleared when a new ingestion of the same gallery starts and
/// otherwise keep their terminal value until superseded.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    entries: Mutex<AHashMap<String, Progress>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&self, gallery: &str) {
        self.entries.lock().remove(gallery);
    }

    /// Record a percentage, clamped to 0..=100
    pub fn set(&self, gallery: &str, percent: f64) {
        self.entries
            .lock()
            .insert(gallery.to_string(), Progress::Percent(percent.clamp(0.0, 100.0)));
    }

    pub fn fail(&self, gallery: &str) {
        self.entries.lock().insert(gallery.to_string(), Progress::Failed);
    }

    pub fn get(&self, gallery: &str) -> Option<Progress> {
        self.entries.lock().get(gallery).copied()
    }
}
