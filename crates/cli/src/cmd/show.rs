//! Show the tree of a gallery

use anyhow::{Context, Result};
use gallery_lib::{util, GalleryConfig};
use owo_colors::OwoColorize;

pub fn run(config: &GalleryConfig, gallery: &str, json: bool) -> Result<()> {
    let service = super::open_service(config)?;
    let tree = service.gallery(gallery)?;

    if json {
        let text = serde_json::to_string_pretty(&tree).context("Failed to encode gallery")?;
        println!("{text}");
        return Ok(());
    }

    if tree.is_empty() {
        println!("{}", format!("Gallery '{gallery}' is empty").dimmed());
        return Ok(());
    }
    println!("{} {}", "gallery".yellow().bold(), gallery.cyan());
    print!("{}", util::render_tree(&tree, true));
    Ok(())
}
