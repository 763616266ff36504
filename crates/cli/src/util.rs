//! Shared utilities for CLI commands

use chrono::{DateTime, Utc};
use gallery_core::{GalleryTree, ImageStatus, Node};
use owo_colors::OwoColorize;
use std::fmt::Write;

/// Render a gallery tree as an indented outline
///
/// Folders show their comment and image count; images show date and status.
pub fn render_tree(tree: &GalleryTree, color: bool) -> String {
    let mut out = String::new();
    let header = format!("{} ({} images)", tree.name, tree.image_count());
    let _ = writeln!(out, "{}", paint_folder(&header, color));
    if !tree.comment.is_empty() {
        let _ = writeln!(out, "  # {}", tree.comment);
    }
    render_children(tree, "", color, &mut out);
    out
}

fn render_children(node: &Node, prefix: &str, color: bool, out: &mut String) {
    let total = node.images.len() + node.children.len();
    let mut index = 0;

    for image in &node.images {
        index += 1;
        let branch = if index == total { "└── " } else { "├── " };
        let _ = writeln!(
            out,
            "{prefix}{branch}{} {} {}",
            image.filename,
            image.modification_date,
            paint_status(image.status(), color)
        );
    }

    for child in &node.children {
        index += 1;
        let last = index == total;
        let branch = if last { "└── " } else { "├── " };
        let label = format!("{}/ ({})", child.name, child.image_count());
        let _ = writeln!(out, "{prefix}{branch}{}", paint_folder(&label, color));

        let nested = format!("{prefix}{}", if last { "    " } else { "│   " });
        if !child.comment.is_empty() {
            let _ = writeln!(out, "{nested}# {}", child.comment);
        }
        render_children(child, &nested, color, out);
    }
}

fn paint_folder(label: &str, color: bool) -> String {
    if color {
        label.bold().blue().to_string()
    } else {
        label.to_string()
    }
}

fn paint_status(status: ImageStatus, color: bool) -> String {
    let label = format!("[{status}]");
    if !color {
        return label;
    }
    match status {
        ImageStatus::Good => label.green().to_string(),
        ImageStatus::Bad => label.red().to_string(),
        ImageStatus::Neutral => label.dimmed().to_string(),
    }
}

/// Format a timestamp as relative time ("2 hours ago")
pub fn format_relative_time(ts: DateTime<Utc>) -> String {
    let seconds = (Utc::now() - ts).num_seconds();
    if seconds < 0 {
        return "in the future".to_string();
    }

    if seconds < 60 {
        format!("{} seconds ago", seconds)
    } else if seconds < 3600 {
        format!("{} minutes ago", seconds / 60)
    } else if seconds < 86400 {
        format!("{} hours ago", seconds / 3600)
    } else if seconds < 604800 {
        format!("{} days ago", seconds / 86400)
    } else {
        format!("{} weeks ago", seconds / 604800)
    }
}

/// Format a timestamp as "2024-01-03 14:30:00 UTC"
pub fn format_absolute_time(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
