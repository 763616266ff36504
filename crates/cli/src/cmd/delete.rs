//! Delete images and folders

use anyhow::Result;
use gallery_lib::GalleryConfig;
use owo_colors::OwoColorize;

pub fn run(config: &GalleryConfig, gallery: &str, paths: &[String], yes: bool) -> Result<()> {
    let service = super::open_service(config)?;

    if !yes {
        println!("{}", "The following items will be deleted:".bold());
        for path in paths {
            println!("  {}", path.red());
        }
        if !super::confirm("Continue?")? {
            println!("{}", "Aborted".yellow());
            return Ok(());
        }
    }

    let before = service.gallery(gallery)?.image_count();
    let tree = service.delete_items(gallery, paths)?;
    let removed = before.saturating_sub(tree.image_count());

    println!(
        "{} Deleted {} image(s), {} remaining",
        "✓".green(),
        removed,
        tree.image_count()
    );
    Ok(())
}
