//! Gallery CLI - gallery command

use anyhow::Result;
use clap::{Parser, Subcommand};
use gallery_lib::system_config::{self, GalleryConfig, DEFAULT_CONFIG_PATH};
use gallery_lib::logging;
use std::path::PathBuf;

mod cmd;

/// Gallery - folder-structured photo galleries built from zip uploads
#[derive(Parser)]
#[command(name = "gallery")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show configuration
    Config {
        /// Print an annotated example configuration
        #[arg(long)]
        example: bool,
        /// Print the configuration file path
        #[arg(long)]
        path: bool,
    },
    #[command(flatten)]
    Gallery(GalleryCommand),
}

/// Commands that run against a loaded configuration
#[derive(Subcommand)]
enum GalleryCommand {
    /// Upload a zip archive of images into a gallery
    Upload {
        /// Gallery name
        gallery: String,
        /// Zip archive to ingest
        archive: PathBuf,
    },
    /// Show the folder tree of a gallery
    Show {
        gallery: String,
        /// Print the raw JSON document
        #[arg(long)]
        json: bool,
    },
    /// Set the comment of a folder
    Comment {
        gallery: String,
        /// Comment text (empty clears it)
        text: String,
        /// Folder path such as `trip/day1` (default: root)
        #[arg(long, default_value = "")]
        node: String,
    },
    /// Mark images as good, bad or neutral
    Mark {
        gallery: String,
        /// good | bad | neutral
        status: String,
        /// Image paths (hashed file names)
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Delete images or whole folders
    Delete {
        gallery: String,
        /// Image or folder paths
        #[arg(required = true)]
        paths: Vec<String>,
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// List saved versions of a gallery
    Versions { gallery: String },
    /// Show one saved version
    Version {
        gallery: String,
        /// Backup file name as listed by `versions`
        filename: String,
        /// Print the raw JSON document
        #[arg(long)]
        json: bool,
    },
    /// Restore a saved version as the current gallery
    Revert {
        gallery: String,
        /// Backup file name as listed by `versions`
        filename: String,
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Must work without a valid config file
        Commands::Config { example, path } => cmd::config::run(&cli.config, example, path),
        Commands::Gallery(command) => {
            let config = system_config::load(&cli.config)?;
            let _log_guard = logging::init(&config.logging)?;
            dispatch(command, &config)
        }
    }
}

fn dispatch(command: GalleryCommand, config: &GalleryConfig) -> Result<()> {
    match command {
        GalleryCommand::Upload { gallery, archive } => cmd::upload::run(config, &gallery, &archive),
        GalleryCommand::Show { gallery, json } => cmd::show::run(config, &gallery, json),
        GalleryCommand::Comment { gallery, text, node } => cmd::comment::run(config, &gallery, &node, &text),
        GalleryCommand::Mark { gallery, status, paths } => cmd::mark::run(config, &gallery, &status, &paths),
        GalleryCommand::Delete { gallery, paths, yes } => cmd::delete::run(config, &gallery, &paths, yes),
        GalleryCommand::Versions { gallery } => cmd::versions::run(config, &gallery),
        GalleryCommand::Version { gallery, filename, json } => {
            cmd::version::run(config, &gallery, &filename, json)
        }
        GalleryCommand::Revert { gallery, filename, yes } => {
            cmd::revert::run(config, &gallery, &filename, yes)
        }
    }
}
