//! Reading image entries out of a zip archive

use crate::IngestError;
use ahash::AHashSet;
use bytes::Bytes;
use gallery_core::hash::split_extension;
use gallery_core::hashed_filename;
use std::io::{Read, Seek};
use tracing::debug;

/// An archive entry ready to be uploaded
#[derive(Debug, Clone)]
pub struct PendingImage {
    /// Bare file name inside the archive
    pub original_name: String,
    /// Storage file name derived from name and date
    pub hashed_filename: String,
    /// `YYYY-MM-DD` taken from the entry timestamp
    pub modification_date: String,
    /// Directory of the entry inside the archive, `/`-separated
    pub folder: String,
    pub content: Bytes,
}

/// Lowercased extensions without the leading dot
pub(crate) fn extension_set(extensions: &[String]) -> AHashSet<String> {
    extensions
        .iter()
        .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

/// Read every allowed image entry from `reader`
///
/// Directory entries and files whose extension is not in `allowed` are
/// skipped. Entry bodies are read fully into memory, at most `max_bytes`
/// in total; sizes declared in entry headers are only trusted to reject
/// early.
pub fn collect_images<R: Read + Seek>(
    reader: R,
    allowed: &AHashSet<String>,
    max_bytes: u64,
) -> Result<Vec<PendingImage>, IngestError> {
    let mut archive = zip::ZipArchive::new(reader)?;
    let mut images = Vec::new();
    let mut remaining = max_bytes;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }

        let name = entry.name().replace('\\', "/");
        let (folder, original_name) = match name.rsplit_once('/') {
            Some((folder, file)) => (folder.to_string(), file.to_string()),
            None => (String::new(), name.clone()),
        };
        if original_name.is_empty() || !is_allowed(&original_name, allowed) {
            debug!(entry = %name, "Skipping archive entry");
            continue;
        }

        let stamp: Option<zip::DateTime> = Option::from(entry.last_modified());
        let stamp = stamp.unwrap_or_default();
        let modification_date = format!("{:04}-{:02}-{:02}", stamp.year(), stamp.month(), stamp.day());

        if entry.size() > remaining {
            return Err(IngestError::TooLarge { limit: max_bytes });
        }
        let mut content = Vec::new();
        entry
            .by_ref()
            .take(remaining.saturating_add(1))
            .read_to_end(&mut content)
            .map_err(|source| IngestError::ReadEntry {
                name: name.clone(),
                source,
            })?;
        remaining = remaining
            .checked_sub(content.len() as u64)
            .ok_or(IngestError::TooLarge { limit: max_bytes })?;

        images.push(PendingImage {
            hashed_filename: hashed_filename(&original_name, &modification_date),
            original_name,
            modification_date,
            folder,
            content: Bytes::from(content),
        });
    }

    Ok(images)
}

fn is_allowed(filename: &str, allowed: &AHashSet<String>) -> bool {
    let (_, ext) = split_extension(filename);
    let ext = ext.trim_start_matches('.');
    !ext.is_empty() && allowed.contains(&ext.to_ascii_lowercase())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    /// Build an in-memory archive; names ending in `/` become directories
    pub(crate) fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored)
            .last_modified_time(zip::DateTime::from_date_and_time(2024, 3, 15, 10, 0, 0).unwrap());

        for (name, content) in entries {
            if name.ends_with('/') {
                writer.add_directory(name.to_string(), options).unwrap();
            } else {
                writer.start_file(name.to_string(), options).unwrap();
                writer.write_all(content).unwrap();
            }
        }
        writer.finish().unwrap().into_inner()
    }

    const LIMIT: u64 = 1 << 20;

    /// Overwrite the uncompressed size of the first central directory entry
    pub(crate) fn patch_declared_size(data: &mut [u8], size: u32) {
        let pos = data
            .windows(4)
            .position(|w| w == b"PK\x01\x02")
            .expect("central directory header");
        data[pos + 24..pos + 28].copy_from_slice(&size.to_le_bytes());
    }

    fn default_allowed() -> AHashSet<String> {
        extension_set(&["jpg".into(), ".JPEG".into(), "png".into(), "gif".into()])
    }

    #[test]
    fn test_collect_filters_and_derives_names() {
        let data = build_zip(&[
            ("A/", b""),
            ("A/1.jpg", b"one"),
            ("A/B/2.png", b"two"),
            ("A/notes.txt", b"text"),
        ]);
        let images = collect_images(Cursor::new(data), &default_allowed(), LIMIT).unwrap();

        assert_eq!(images.len(), 2);
        assert_eq!(images[0].original_name, "1.jpg");
        assert_eq!(images[0].folder, "A");
        assert_eq!(images[0].modification_date, "2024-03-15");
        assert_eq!(images[0].hashed_filename, "1_204197d358cc052859dafd14638fb2ad.jpg");
        assert_eq!(images[0].content.as_ref(), b"one");
        assert_eq!(images[1].folder, "A/B");
        assert_eq!(images[1].hashed_filename, "2_f4438390fa0ce3bc9f4c4e7ed65351be.png");
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        let data = build_zip(&[("IMG.JPG", b"x"), ("pic.Gif", b"y"), ("raw.cr2", b"z")]);
        let images = collect_images(Cursor::new(data), &default_allowed(), LIMIT).unwrap();
        let names: Vec<_> = images.iter().map(|i| i.original_name.as_str()).collect();
        assert_eq!(names, vec!["IMG.JPG", "pic.Gif"]);
        assert_eq!(images[0].folder, "");
    }

    #[test]
    fn test_dotfile_without_extension_is_skipped() {
        let data = build_zip(&[(".jpg", b"x"), ("noext", b"y")]);
        assert!(collect_images(Cursor::new(data), &default_allowed(), LIMIT).unwrap().is_empty());
    }

    #[test]
    fn test_not_a_zip() {
        let err = collect_images(Cursor::new(b"definitely not a zip".to_vec()), &default_allowed(), LIMIT)
            .unwrap_err();
        assert!(matches!(err, IngestError::InvalidArchive(_)));
    }

    #[test]
    fn test_inflated_declared_size_is_rejected() {
        let mut data = build_zip(&[("a.jpg", b"abcd")]);
        patch_declared_size(&mut data, 0xFFFF_FFF0);

        let err = collect_images(Cursor::new(data), &default_allowed(), LIMIT).unwrap_err();
        assert!(matches!(err, IngestError::TooLarge { limit: LIMIT }));
    }

    #[test]
    fn test_total_size_limit() {
        let data = build_zip(&[("a.jpg", b"abc"), ("b.jpg", b"defg")]);
        let err = collect_images(Cursor::new(data.clone()), &default_allowed(), 5).unwrap_err();
        assert!(matches!(err, IngestError::TooLarge { limit: 5 }));

        let images = collect_images(Cursor::new(data), &default_allowed(), 7).unwrap();
        assert_eq!(images.len(), 2);
    }

    #[test]
    fn test_skipped_entries_do_not_count_towards_limit() {
        let data = build_zip(&[("notes.txt", b"0123456789"), ("a.jpg", b"abc")]);
        let images = collect_images(Cursor::new(data), &default_allowed(), 3).unwrap();
        assert_eq!(images[0].content.as_ref(), b"abc");
    }

    #[test]
    fn test_extension_set_normalizes() {
        let set = extension_set(&[".PNG".into(), "".into(), "jpg".into()]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("png"));
    }
}
