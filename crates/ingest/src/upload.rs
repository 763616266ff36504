//! Parallel uploads with bounded retry

use crate::archive::PendingImage;
use gallery_core::layout::image_key;
use gallery_core::Storage;
use rayon::prelude::*;
use rayon::ThreadPool;
use std::fmt::Display;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// How often and how patiently a failed upload is retried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on every further retry
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Sleep before retry number `retry` (0 for the first retry)
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << retry.min(16))
    }

    /// Run `op` until it succeeds or the attempts are used up
    ///
    /// Blocks the calling thread while backing off. Returns the last error.
    pub fn run<T, E, F>(&self, key: &str, mut op: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Result<T, E>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => {
                    if attempt > 1 {
                        info!(key, attempt, "Upload succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) if attempt < attempts => {
                    let delay = self.delay_for(attempt - 1);
                    warn!(key, attempt, delay_ms = delay.as_millis() as u64, error = %e, "Upload failed, retrying");
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Upload every image of `gallery` on `pool`
///
/// `on_settled` runs once per image after it either succeeded or used up
/// its retries. Images that could not be stored are logged and left out of
/// the result; the order of the survivors is preserved.
pub fn upload_all<F>(
    pool: &ThreadPool,
    storage: &dyn Storage,
    gallery: &str,
    images: Vec<PendingImage>,
    policy: &RetryPolicy,
    on_settled: F,
) -> Vec<PendingImage>
where
    F: Fn() + Sync,
{
    pool.install(|| {
        images
            .into_par_iter()
            .filter_map(|image| {
                let key = image_key(gallery, &image.hashed_filename);
                let result = policy.run(&key, || storage.save(&key, &image.content));
                on_settled();
                match result {
                    Ok(()) => {
                        debug!(gallery, key = %key, "Uploaded image");
                        Some(image)
                    }
                    Err(e) => {
                        error!(gallery, key = %key, error = %e, "Error uploading image, dropping it");
                        None
                    }
                }
            })
            .collect()
    })
}
