//! Configuration command
//!
//! Shows the effective configuration, its file path or an annotated example.

use anyhow::Result;
use gallery_lib::system_config::{self, StorageBackend};
use owo_colors::OwoColorize;
use std::path::Path;

pub fn run(config_path: &Path, example: bool, path: bool) -> Result<()> {
    if example {
        println!("{}", system_config::example_config());
        return Ok(());
    }
    if path {
        println!("{}", config_path.display());
        if !config_path.exists() {
            println!("{}", "File does not exist; defaults are in effect.".yellow());
        }
        return Ok(());
    }

    let config = system_config::load(config_path)?;
    println!("{}", "Gallery Configuration".bold());
    println!("{}: {}\n", "Location".dimmed(), config_path.display().dimmed());

    println!("{}", "[storage]".yellow());
    let backend = match config.storage.backend {
        StorageBackend::Local => "local",
        StorageBackend::Memory => "memory",
    };
    println!("  {} = {}", "backend".cyan(), backend);
    println!(
        "  {} = {}",
        "base_directory".cyan(),
        config.storage.base_directory.display()
    );

    println!("\n{}", "[upload]".yellow());
    println!("  {} = {}", "workers".cyan(), config.upload.workers);
    println!(
        "  {} = {}",
        "max_archive_bytes".cyan(),
        config.upload.max_archive_bytes
    );
    println!("  {} = {}", "max_attempts".cyan(), config.upload.max_attempts);
    println!(
        "  {} = {} {}",
        "base_backoff_ms".cyan(),
        config.upload.base_backoff_ms,
        "(doubles per retry)".dimmed()
    );
    println!(
        "  {} = {}",
        "allowed_extensions".cyan(),
        config.upload.allowed_extensions.join(", ")
    );

    println!("\n{}", "[versioning]".yellow());
    println!(
        "  {} = {}",
        "snapshot_on_revert".cyan(),
        config.versioning.snapshot_on_revert
    );

    println!("\n{}", "[logging]".yellow());
    println!("  {} = {}", "level".cyan(), config.logging.level);
    match &config.logging.log_file {
        Some(file) => println!("  {} = {}", "log_file".cyan(), file.display()),
        None => println!("  {} = {}", "log_file".cyan(), "(stderr)".dimmed()),
    }

    println!("\n{}", "Valid Ranges:".bold());
    println!("  workers: 1-64");
    println!("  max_attempts: 1-10");
    println!("  base_backoff_ms: 0-60000");

    Ok(())
}
