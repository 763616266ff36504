//! Restore a saved version

use anyhow::Result;
use gallery_lib::GalleryConfig;
use owo_colors::OwoColorize;

pub fn run(config: &GalleryConfig, gallery: &str, filename: &str, yes: bool) -> Result<()> {
    let service = super::open_service(config)?;

    if !yes {
        if !config.versioning.snapshot_on_revert {
            println!(
                "{}",
                "The current version will be overwritten without a backup.".yellow()
            );
        }
        if !super::confirm(&format!("Revert '{gallery}' to {filename}?"))? {
            println!("{}", "Aborted".yellow());
            return Ok(());
        }
    }

    let tree = service.revert(gallery, filename)?;
    println!(
        "{} Reverted {} to {} ({} images)",
        "✓".green(),
        gallery.cyan(),
        filename,
        tree.image_count()
    );
    Ok(())
}
