//! Upload a zip archive into a gallery

use anyhow::{bail, Context, Result};
use crossbeam_channel::Receiver;
use gallery_core::{ChannelSink, GalleryEvent};
use gallery_lib::{util, GalleryConfig, GalleryService, UploadOutcome};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub fn run(config: &GalleryConfig, gallery: &str, archive: &Path) -> Result<()> {
    let data = std::fs::read(archive)
        .with_context(|| format!("Failed to read archive {}", archive.display()))?;

    let (sink, events) = ChannelSink::new();
    let service = GalleryService::from_config(config, Arc::new(sink))?;
    let ticket = service.submit_upload(gallery, data)?;

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}")?
            .progress_chars("=> "),
    );
    bar.set_message(format!("uploading into {gallery}"));

    let outcome = loop {
        drain_progress(&events, &bar);
        if let Some(outcome) = ticket.wait_timeout(Duration::from_millis(100))? {
            drain_progress(&events, &bar);
            break outcome;
        }
        bar.tick();
    };

    match outcome {
        UploadOutcome::Completed(tree) => {
            bar.finish_with_message("done");
            println!(
                "{} Gallery {} now holds {} images",
                "✓".green(),
                gallery.cyan(),
                tree.image_count()
            );
            print!("{}", util::render_tree(&tree, true));
            Ok(())
        }
        UploadOutcome::Failed { gallery, reason } => {
            bar.abandon_with_message("failed");
            bail!("Upload into '{gallery}' failed: {reason}")
        }
    }
}

fn drain_progress(events: &Receiver<GalleryEvent>, bar: &ProgressBar) {
    for event in events.try_iter() {
        if let GalleryEvent::UploadProgress { progress, .. } = event {
            bar.set_position(progress.round() as u64);
        }
    }
}
