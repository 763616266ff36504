//! Gallery command-line library
//!
//! Exposes the service layer, configuration and logging setup used by the
//! `gallery` binary so they can be driven from integration tests.

pub mod logging;
pub mod service;
pub mod system_config;
pub mod util;

pub use service::{GalleryService, UploadOutcome, UploadTicket};
pub use system_config::GalleryConfig;
