//! Snapshot naming
//!
//! Snapshots are named `gallery_data_<YYYYMMDDHHMMSS>.json` with a UTC
//! timestamp at second precision. Names that do not follow the pattern are
//! never treated as snapshots.

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use serde::Serialize;

const PREFIX: &str = "gallery_data_";
const SUFFIX: &str = ".json";
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
const TIMESTAMP_LEN: usize = 14;

/// A snapshot of a gallery document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupEntry {
    /// File name inside the gallery's backup directory
    pub filename: String,
    /// When the snapshot was taken (UTC, whole seconds)
    pub timestamp: DateTime<Utc>,
}

impl BackupEntry {
    /// Entry for a snapshot taken at `timestamp`
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        let timestamp = timestamp.trunc_subsecs(0);
        Self {
            filename: format!("{PREFIX}{}{SUFFIX}", timestamp.format(TIMESTAMP_FORMAT)),
            timestamp,
        }
    }

    /// Entry for a snapshot taken now
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    /// Parse a snapshot file name, `None` if it does not follow the pattern
    pub fn parse(filename: &str) -> Option<Self> {
        let stamp = filename.strip_prefix(PREFIX)?.strip_suffix(SUFFIX)?;
        if stamp.len() != TIMESTAMP_LEN || !stamp.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let timestamp = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT)
            .ok()?
            .and_utc();
        Some(Self {
            filename: filename.to_string(),
            timestamp,
        })
    }

    /// Whether a name looks like a snapshot, regardless of timestamp validity
    pub(crate) fn has_snapshot_shape(filename: &str) -> bool {
        filename.starts_with(PREFIX) && filename.ends_with(SUFFIX)
    }
}
