//! Show one saved version

use anyhow::{Context, Result};
use gallery_lib::{util, GalleryConfig};
use owo_colors::OwoColorize;

pub fn run(config: &GalleryConfig, gallery: &str, filename: &str, json: bool) -> Result<()> {
    let service = super::open_service(config)?;
    let tree = service
        .version(gallery, filename)?
        .with_context(|| format!("Version '{filename}' of '{gallery}' not found"))?;

    if json {
        let text = serde_json::to_string_pretty(&tree).context("Failed to encode gallery")?;
        println!("{text}");
        return Ok(());
    }

    println!("{} {}", "version".yellow().bold(), filename.cyan());
    print!("{}", util::render_tree(&tree, true));
    Ok(())
}
