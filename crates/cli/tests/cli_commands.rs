//! Running the `gallery` binary against a local storage directory

mod common;

use common::cli::GalleryCommand;
use gallery_core::Node;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("config.toml");
        let storage = dir.path().join("data");
        std::fs::write(
            &config,
            format!(
                "[storage]\nbase_directory = {:?}\n\n[upload]\nbase_backoff_ms = 0\n\n[logging]\nlevel = \"warn\"\n",
                storage.display().to_string()
            ),
        )
        .unwrap();
        Self { dir, config }
    }

    fn cmd(&self, args: &[&str]) -> GalleryCommand {
        let mut cmd = GalleryCommand::new(&self.config);
        cmd.args(args);
        cmd
    }

    fn write_zip(&self, name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, common::build_zip(entries)).unwrap();
        path
    }

    fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    fn show(&self, gallery: &str) -> Node {
        let stdout = self.cmd(&["show", gallery, "--json"]).assert_success();
        serde_json::from_str(&stdout).unwrap()
    }
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

#[test]
fn test_config_example_and_path() {
    let ws = Workspace::new();
    let example = ws.cmd(&["config", "--example"]).assert_success();
    assert!(example.contains("[upload]"));
    assert!(example.contains("snapshot_on_revert = false"));

    let path = ws.cmd(&["config", "--path"]).assert_success();
    assert!(path.contains("config.toml"));
}

#[test]
fn test_invalid_config_is_reported() {
    let ws = Workspace::new();
    std::fs::write(&ws.config, "[upload]\nworkers = 0\n").unwrap();
    let stderr = ws.cmd(&["show", "g"]).assert_failure();
    assert!(stderr.contains("workers"));

    // Config inspection still works with a broken file
    let path = ws.cmd(&["config", "--path"]).assert_success();
    assert!(path.contains("config.toml"));
}

#[test]
fn test_oversized_upload_is_refused() {
    let ws = Workspace::new();
    std::fs::write(
        &ws.config,
        format!(
            "[storage]\nbase_directory = {:?}\n\n[upload]\nmax_archive_bytes = 32\n",
            ws.data_dir().display().to_string()
        ),
    )
    .unwrap();
    let archive = ws.write_zip("big.zip", &[("a.jpg", &[7u8; 256])]);

    let stderr = ws.cmd(&["upload", "g", &path_arg(&archive)]).assert_failure();
    assert!(stderr.contains("upload limit"), "{stderr}");
    assert!(!ws.data_dir().join("g/gallery_data.json").exists());
}

#[test]
fn test_upload_show_mark_delete() {
    let ws = Workspace::new();
    let archive = ws.write_zip("photos.zip", &[("A/1.jpg", b"one"), ("A/B/2.png", b"two")]);

    ws.cmd(&["upload", "trip", &path_arg(&archive)]).assert_success();
    assert!(ws.data_dir().join("trip/gallery_data.json").is_file());

    let tree = ws.show("trip");
    assert_eq!(tree.image_count(), 2);
    let image = tree.find_node_by_path("A").unwrap().images[0].filename.clone();

    ws.cmd(&["mark", "trip", "bad", &image]).assert_success();
    let tree = ws.show("trip");
    assert_eq!(
        tree.find_node_by_path("A").unwrap().images[0].status(),
        gallery_core::ImageStatus::Bad
    );

    ws.cmd(&["mark", "trip", "awful", &image]).assert_failure();

    ws.cmd(&["comment", "trip", "day one", "--node", "A"]).assert_success();
    assert_eq!(ws.show("trip").find_node_by_path("A").unwrap().comment, "day one");

    ws.cmd(&["delete", "trip", "A/B", "-y"]).assert_success();
    let tree = ws.show("trip");
    assert!(tree.find_node_by_path("A/B").is_none());
    assert_eq!(tree.image_count(), 1);

    let versions = ws.cmd(&["versions", "trip"]).assert_success();
    assert!(versions.contains("gallery_data_"));
}

#[test]
fn test_upload_of_corrupt_archive_fails() {
    let ws = Workspace::new();
    let archive = ws.dir.path().join("broken.zip");
    std::fs::write(&archive, b"not a zip at all").unwrap();

    ws.cmd(&["upload", "trip", &path_arg(&archive)]).assert_failure();
    assert!(!ws.data_dir().join("trip/gallery_data.json").exists());
}

#[test]
fn test_revert_restores_version() {
    let ws = Workspace::new();
    let archive = ws.write_zip("photos.zip", &[("x.gif", b"x")]);
    ws.cmd(&["upload", "g", &path_arg(&archive)]).assert_success();
    ws.cmd(&["comment", "g", "changed"]).assert_success();

    let backups: Vec<String> = std::fs::read_dir(ws.data_dir().join("backups/g"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(backups.len(), 1);

    let version = ws.cmd(&["version", "g", &backups[0], "--json"]).assert_success();
    let old: Node = serde_json::from_str(&version).unwrap();
    assert_eq!(old.comment, "");

    ws.cmd(&["revert", "g", &backups[0], "--yes"]).assert_success();
    assert_eq!(ws.show("g").comment, "");
}
