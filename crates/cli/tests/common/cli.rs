//! Helpers for running the `gallery` binary

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// `gallery` invocation bound to a config file
pub struct GalleryCommand {
    config: PathBuf,
    args: Vec<String>,
}

impl GalleryCommand {
    pub fn new(config: impl AsRef<Path>) -> Self {
        Self {
            config: config.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn output(&self) -> Output {
        Command::new(env!("CARGO_BIN_EXE_gallery"))
            .arg("--config")
            .arg(&self.config)
            .args(&self.args)
            .output()
            .expect("failed to run gallery binary")
    }

    /// Run and return stdout, panicking with stderr on failure
    pub fn assert_success(&self) -> String {
        let output = self.output();
        assert!(
            output.status.success(),
            "gallery {:?} failed:\n{}",
            self.args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    /// Run expecting failure and return stderr
    pub fn assert_failure(&self) -> String {
        let output = self.output();
        assert!(!output.status.success(), "gallery {:?} unexpectedly succeeded", self.args);
        String::from_utf8_lossy(&output.stderr).into_owned()
    }
}
