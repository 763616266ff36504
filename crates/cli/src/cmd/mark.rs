//! Mark images good, bad or neutral

use anyhow::Result;
use gallery_lib::GalleryConfig;
use owo_colors::OwoColorize;

pub fn run(config: &GalleryConfig, gallery: &str, status: &str, paths: &[String]) -> Result<()> {
    let service = super::open_service(config)?;
    service.set_image_status(gallery, paths, status)?;

    println!(
        "{} Marked {} image path(s) as {}",
        "✓".green(),
        paths.len(),
        status.to_ascii_lowercase().bold()
    );
    Ok(())
}
