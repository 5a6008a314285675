//! Shared helpers for library integration tests.

use std::fs;
use std::path::Path;

use arbor_lib::{BuildError, BuildOutput, Builder, Environment, LintPolicy};
use tempfile::TempDir;

/// A throwaway project directory.
pub struct ProjectFixture {
  pub temp: TempDir,
}

impl ProjectFixture {
  /// A project named `app-name` with an empty `src/ui/index.html`.
  pub fn new() -> Self {
    let fixture = Self {
      temp: TempDir::new().unwrap(),
    };
    fixture.write("package.json", r#"{ "name": "app-name", "version": "0.1.0" }"#);
    fixture.write("src/ui/index.html", "<html></html>");
    fixture
  }

  pub fn root(&self) -> &Path {
    self.temp.path()
  }

  /// Write a file relative to the project root.
  pub fn write(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
  }

  pub fn builder(&self, environment: Environment, lint: LintPolicy) -> Result<Builder, BuildError> {
    Builder::from_project(self.root(), environment, lint)
  }

  pub fn build(&self) -> Result<BuildOutput, BuildError> {
    self.builder(Environment::Development, LintPolicy::Disabled)?.build()
  }
}
