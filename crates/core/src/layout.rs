//! Storage key layout shared by every engine
//!
//! ```text
//! <gallery>/gallery_data.json                        current document
//! <gallery>/<hashed_filename>                        image bodies
//! backups/<gallery>/gallery_data_<YYYYMMDDHHMMSS>.json  snapshots
//! ```

/// File name of the current gallery document
pub const DOCUMENT_NAME: &str = "gallery_data.json";

/// Top-level namespace holding per-gallery snapshots
pub const BACKUP_ROOT: &str = "backups";

/// Key of the current document for `gallery`
pub fn document_key(gallery: &str) -> String {
    format!("{gallery}/{DOCUMENT_NAME}")
}

/// Key of an image body stored for `gallery`
pub fn image_key(gallery: &str, filename: &str) -> String {
    format!("{gallery}/{filename}")
}

/// Directory holding the snapshots of `gallery`
pub fn backup_dir(gallery: &str) -> String {
    format!("{BACKUP_ROOT}/{gallery}")
}

/// Key of one snapshot of `gallery`
pub fn backup_key(gallery: &str, filename: &str) -> String {
    format!("{BACKUP_ROOT}/{gallery}/{filename}")
}
