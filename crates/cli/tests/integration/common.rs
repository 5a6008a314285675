//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Isolated test project.
///
/// Each test gets its own temporary directory holding a project named
/// `app-name` with an `src/ui/index.html`.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    let env = Self {
      temp: TempDir::new().unwrap(),
    };
    env.write_file("package.json", r#"{ "name": "app-name" }"#);
    env.write_file("src/ui/index.html", r#"<script src="{{rootURL}}app.js"></script>"#);
    env
  }

  /// Write a file relative to the project root.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  pub fn project_path(&self) -> PathBuf {
    self.temp.path().to_path_buf()
  }

  /// Output directory (isolated per test).
  pub fn output_path(&self) -> PathBuf {
    self.temp.path().join("out")
  }

  pub fn read_output(&self, relative_path: &str) -> String {
    std::fs::read_to_string(self.output_path().join(relative_path)).unwrap()
  }

  /// Command for the arbor binary with a clean environment variable set.
  pub fn arbor_cmd(&self) -> Command {
    let mut cmd = cargo_bin_cmd!("arbor");
    cmd.env_remove("ARBOR_ENV").env_remove("RUST_LOG");
    cmd
  }

  /// `arbor build <project> -o <out>`
  pub fn build_cmd(&self) -> Command {
    let mut cmd = self.arbor_cmd();
    cmd.arg("build").arg(self.project_path()).arg("-o").arg(self.output_path());
    cmd
  }
}
