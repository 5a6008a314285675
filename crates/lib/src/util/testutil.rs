//! Test fixtures for arbor-lib.
//!
//! Helpers for laying out throwaway projects on disk and building them in
//! memory.

use std::fs;
use std::path::Path;

use crate::options::{BuildOptions, TreeSource};
use crate::project::Project;
use crate::tree::FileTree;

/// Write `files` under `root`, creating parent directories.
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
  for (path, content) in files {
    let full = root.join(path);
    if let Some(parent) = full.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(full, content).unwrap();
  }
}

/// A project named `app-name` rooted at `root` with a `package.json`.
pub fn project_at(root: &Path) -> Project {
  write_files(root, &[("package.json", r#"{ "name": "app-name" }"#)]);
  Project::load(root).unwrap()
}

/// A tree from literal pairs.
pub fn tree(files: &[(&str, &str)]) -> FileTree {
  FileTree::from_files(files.iter().copied()).unwrap()
}

/// Options that build `src` from memory with empty auxiliary trees.
pub fn memory_options(src: &[(&str, &str)]) -> BuildOptions {
  let mut options = BuildOptions::default();
  options.trees.src = Some(TreeSource::Tree(tree(src)));
  options.trees.node_modules = Some(TreeSource::Tree(FileTree::new()));
  options.trees.public = Some(TreeSource::Tree(FileTree::new()));
  options
}
