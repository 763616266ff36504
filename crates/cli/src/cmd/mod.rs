//! CLI command implementations

pub mod comment;
pub mod config;
pub mod delete;
pub mod mark;
pub mod revert;
pub mod show;
pub mod upload;
pub mod version;
pub mod versions;

use anyhow::{Context, Result};
use gallery_core::NullSink;
use gallery_lib::{GalleryConfig, GalleryService};
use std::io::{BufRead, Write};
use std::sync::Arc;

/// Service for commands that do not follow events
pub fn open_service(config: &GalleryConfig) -> Result<GalleryService> {
    GalleryService::from_config(config, Arc::new(NullSink))
}

/// Ask a yes/no question on stdin; anything but `y`/`yes` declines
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    std::io::stdout().flush().context("Failed to flush stdout")?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read answer")?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
