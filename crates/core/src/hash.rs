//! Deterministic storage names for uploaded images
//!
//! The storage key of an image is derived from its original name and the
//! modification date recorded in the archive, so re-uploading an unchanged
//! file reproduces the same key.

use md5::{Digest, Md5};

/// MD5 of `data` as lowercase hex
pub fn md5_hex(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}

/// Build `<stem>_<md5(original-date)><.ext>` for an original file name
///
/// `original_filename` is the bare file name (no directories). The extension
/// keeps its original case; names without an extension get no suffix.
pub fn hashed_filename(original_filename: &str, modification_date: &str) -> String {
    let (stem, ext) = split_extension(original_filename);
    let digest = md5_hex(format!("{original_filename}-{modification_date}").as_bytes());
    format!("{stem}_{digest}{ext}")
}

/// Split a file name into stem and extension (extension includes the dot)
///
/// Leading dots do not start an extension, so `.hidden` has no extension.
pub fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(idx) if filename[..idx].chars().any(|c| c != '.') => filename.split_at(idx),
        _ => (filename, ""),
    }
}
