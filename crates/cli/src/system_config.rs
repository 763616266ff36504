//! Gallery configuration file
//!
//! Loaded once at startup from TOML and passed by reference into the
//! engines. Every field has a default, so a missing file or section is fine;
//! unknown keys are rejected.

use anyhow::{ensure, Context, Result};
use ingest::{IngestConfig, RetryPolicy};
use journal::VersioningConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::level_filters::LevelFilter;

/// Config file used when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

const MAX_ARCHIVE_LIMIT: u64 = 1 << 30;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    pub storage: StorageConfig,
    pub upload: UploadConfig,
    pub versioning: VersioningSection,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Local,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Root directory of the local backend
    pub base_directory: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            base_directory: PathBuf::from("gallery_data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    pub workers: usize,
    /// Largest accepted archive, also the cap on image bytes read from it
    pub max_archive_bytes: u64,
    pub max_attempts: u32,
    pub base_backoff_ms: u64,
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        let ingest = IngestConfig::default();
        Self {
            workers: ingest.workers,
            max_archive_bytes: ingest.max_archive_bytes,
            max_attempts: ingest.retry.max_attempts,
            base_backoff_ms: ingest.retry.base_delay.as_millis() as u64,
            allowed_extensions: ingest.allowed_extensions,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VersioningSection {
    pub snapshot_on_revert: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_file: None,
        }
    }
}

impl LoggingConfig {
    pub fn level_filter(&self) -> Result<LevelFilter> {
        self.level
            .parse::<LevelFilter>()
            .with_context(|| format!("Invalid log level '{}'", self.level))
    }
}

impl GalleryConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        let upload = &self.upload;
        ensure!(
            (1..=64).contains(&upload.workers),
            "upload.workers must be between 1 and 64 (got {})",
            upload.workers
        );
        ensure!(
            (1..=MAX_ARCHIVE_LIMIT).contains(&upload.max_archive_bytes),
            "upload.max_archive_bytes must be between 1 and {} (got {})",
            MAX_ARCHIVE_LIMIT,
            upload.max_archive_bytes
        );
        ensure!(
            (1..=10).contains(&upload.max_attempts),
            "upload.max_attempts must be between 1 and 10 (got {})",
            upload.max_attempts
        );
        ensure!(
            upload.base_backoff_ms <= 60_000,
            "upload.base_backoff_ms must be at most 60000 (got {})",
            upload.base_backoff_ms
        );
        ensure!(
            upload
                .allowed_extensions
                .iter()
                .any(|ext| !ext.trim_start_matches('.').is_empty()),
            "upload.allowed_extensions must name at least one extension"
        );
        self.logging.level_filter()?;
        Ok(())
    }

    pub fn ingest_config(&self) -> IngestConfig {
        IngestConfig {
            workers: self.upload.workers,
            max_archive_bytes: self.upload.max_archive_bytes,
            retry: RetryPolicy {
                max_attempts: self.upload.max_attempts,
                base_delay: Duration::from_millis(self.upload.base_backoff_ms),
            },
            allowed_extensions: self.upload.allowed_extensions.clone(),
        }
    }

    pub fn versioning_config(&self) -> VersioningConfig {
        VersioningConfig {
            snapshot_on_revert: self.versioning.snapshot_on_revert,
        }
    }
}

/// Parse and validate configuration text
pub fn parse(text: &str) -> Result<GalleryConfig> {
    let config: GalleryConfig = toml::from_str(text).context("Failed to parse configuration")?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from `path`, falling back to defaults if it is missing
pub fn load(path: &Path) -> Result<GalleryConfig> {
    if !path.exists() {
        return Ok(GalleryConfig::default());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse(&text).with_context(|| format!("Invalid config file {}", path.display()))
}

/// Annotated configuration with every default spelled out
pub fn example_config() -> String {
    r#"# Gallery configuration

[storage]
# "local" stores files under base_directory, "memory" keeps them in-process
backend = "local"
base_directory = "gallery_data"

[upload]
# Parallel upload workers (1-64)
workers = 8
# Largest accepted archive in bytes, 16 MiB by default (1-1073741824)
max_archive_bytes = 16777216
# Attempts per file including the first (1-10)
max_attempts = 3
# Delay before the first retry; doubles per retry (0-60000)
base_backoff_ms = 1000
allowed_extensions = ["jpg", "jpeg", "png", "gif"]

[versioning]
# Back up the current document before reverting to an older one
snapshot_on_revert = false

[logging]
# trace | debug | info | warn | error
level = "info"
# log_file = "logs/app.log"
"#
    .to_string()
}
