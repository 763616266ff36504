//! List saved versions

use anyhow::Result;
use gallery_lib::{util, GalleryConfig};
use owo_colors::OwoColorize;

pub fn run(config: &GalleryConfig, gallery: &str) -> Result<()> {
    let service = super::open_service(config)?;
    let versions = service.versions(gallery)?;

    if versions.is_empty() {
        println!("{}", format!("No saved versions for '{gallery}'").dimmed());
        return Ok(());
    }

    println!("{} ({})", "Saved versions".bold(), versions.len());
    for entry in &versions {
        println!(
            "  {}  {} {}",
            entry.filename.cyan(),
            util::format_absolute_time(entry.timestamp),
            format!("({})", util::format_relative_time(entry.timestamp)).dimmed()
        );
    }
    Ok(())
}
