//! Set a folder comment

use anyhow::Result;
use gallery_lib::GalleryConfig;
use owo_colors::OwoColorize;

pub fn run(config: &GalleryConfig, gallery: &str, node: &str, text: &str) -> Result<()> {
    let service = super::open_service(config)?;
    service.set_comment(gallery, node, text)?;

    let target = if node.is_empty() { "root" } else { node };
    println!("{} Updated comment on {}", "✓".green(), target.cyan());
    Ok(())
}
