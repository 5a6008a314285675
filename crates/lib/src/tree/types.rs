use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::util::hash::{ContentHash, hash_records, records_for_files};

/// Shared, immutable file contents.
pub type Contents = Arc<[u8]>;

/// Errors produced while building, combining or materialising trees.
#[derive(Debug, Error)]
pub enum TreeError {
  #[error("invalid path '{path}': {reason}")]
  InvalidPath { path: String, reason: &'static str },

  #[error("duplicate path '{0}'")]
  Duplicate(String),

  #[error("conflicting output paths: '{path}' is produced by both {first} and {second}")]
  Conflict { path: String, first: String, second: String },

  #[error("not a directory: {}", .0.display())]
  NotADirectory(PathBuf),

  #[error("failed to walk {}: {message}", path.display())]
  Walk { path: PathBuf, message: String },

  #[error("failed to read {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to write {}: {source}", path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Normalize a relative tree path.
///
/// # Errors
///
/// Returns `InvalidPath` for empty paths, absolute paths and paths containing `..`.
pub fn normalize_path(path: &str) -> Result<String, TreeError> {
  let replaced = path.replace('\\', "/");
  if replaced.starts_with('/') {
    return Err(TreeError::InvalidPath {
      path: path.to_string(),
      reason: "path must be relative",
    });
  }

  let mut segments = Vec::new();
  for segment in replaced.split('/') {
    match segment {
      "" | "." => continue,
      ".." => {
        return Err(TreeError::InvalidPath {
          path: path.to_string(),
          reason: "path must not contain '..'",
        });
      }
      s => segments.push(s),
    }
  }

  if segments.is_empty() {
    return Err(TreeError::InvalidPath {
      path: path.to_string(),
      reason: "path is empty",
    });
  }

  Ok(segments.join("/"))
}

/// An immutable snapshot of `path -> contents` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTree {
  files: Arc<BTreeMap<String, Contents>>,
}

impl FileTree {
  /// An empty tree.
  pub fn new() -> Self {
    Self::default()
  }

  /// Build a tree from path/content pairs.
  ///
  /// # Errors
  ///
  /// Fails on invalid paths and on two pairs normalizing to the same path.
  pub fn from_files<P, C>(files: impl IntoIterator<Item = (P, C)>) -> Result<Self, TreeError>
  where
    P: AsRef<str>,
    C: AsRef<[u8]>,
  {
    let mut builder = TreeBuilder::new();
    for (path, contents) in files {
      builder.add(path.as_ref(), contents.as_ref())?;
    }
    Ok(builder.build())
  }

  fn from_map(files: BTreeMap<String, Contents>) -> Self {
    Self { files: Arc::new(files) }
  }

  pub fn len(&self) -> usize {
    self.files.len()
  }

  pub fn is_empty(&self) -> bool {
    self.files.is_empty()
  }

  pub fn contains(&self, path: &str) -> bool {
    self.files.contains_key(path)
  }

  pub fn get(&self, path: &str) -> Option<&[u8]> {
    self.files.get(path).map(|c| c.as_ref())
  }

  /// Contents of `path` as UTF-8, if present and valid.
  pub fn get_str(&self, path: &str) -> Option<&str> {
    self.get(path).and_then(|bytes| std::str::from_utf8(bytes).ok())
  }

  /// Paths in sorted order.
  pub fn paths(&self) -> impl Iterator<Item = &str> {
    self.files.keys().map(String::as_str)
  }

  /// Entries in sorted path order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
    self.files.iter().map(|(path, contents)| (path.as_str(), contents.as_ref()))
  }

  /// A new tree with `path` added.
  ///
  /// # Errors
  ///
  /// Fails if the path is invalid or already present.
  pub fn insert(&self, path: &str, contents: impl AsRef<[u8]>) -> Result<Self, TreeError> {
    let path = normalize_path(path)?;
    if self.files.contains_key(&path) {
      return Err(TreeError::Duplicate(path));
    }
    let mut files = (*self.files).clone();
    files.insert(path, Arc::from(contents.as_ref()));
    Ok(Self::from_map(files))
  }

  /// A new tree with `path` removed (unchanged if absent).
  pub fn without(&self, path: &str) -> Self {
    if !self.files.contains_key(path) {
      return self.clone();
    }
    let mut files = (*self.files).clone();
    files.remove(path);
    Self::from_map(files)
  }

  /// The subtree under `dir`, re-rooted so that `dir/a.js` becomes `a.js`.
  pub fn select(&self, dir: &str) -> Self {
    let prefix = format!("{}/", dir.trim_matches('/'));
    Self::from_map(
      self
        .files
        .iter()
        .filter_map(|(path, contents)| {
          path
            .strip_prefix(&prefix)
            .map(|rest| (rest.to_string(), contents.clone()))
        })
        .collect(),
    )
  }

  /// Whether any file lives under `dir`.
  pub fn has_dir(&self, dir: &str) -> bool {
    let prefix = format!("{}/", dir.trim_matches('/'));
    self.files.keys().any(|path| path.starts_with(&prefix))
  }

  /// The files whose path satisfies `keep`.
  pub fn filter(&self, keep: impl Fn(&str) -> bool) -> Self {
    Self::from_map(
      self
        .files
        .iter()
        .filter(|(path, _)| keep(path))
        .map(|(path, contents)| (path.clone(), contents.clone()))
        .collect(),
    )
  }

  /// Move every file under `dir`.
  pub fn prefixed(&self, dir: &str) -> Result<Self, TreeError> {
    let dir = normalize_path(dir)?;
    self.map_paths(|path| format!("{}/{}", dir, path))
  }

  /// Rename every file through `rename`.
  ///
  /// # Errors
  ///
  /// Fails if a new path is invalid or two files end up on the same path.
  pub fn map_paths(&self, mut rename: impl FnMut(&str) -> String) -> Result<Self, TreeError> {
    let mut files = BTreeMap::new();
    for (path, contents) in self.files.iter() {
      let renamed = normalize_path(&rename(path))?;
      if files.insert(renamed.clone(), contents.clone()).is_some() {
        return Err(TreeError::Duplicate(renamed));
      }
    }
    Ok(Self::from_map(files))
  }

  /// Rewrite the contents of every file.
  ///
  /// Files are visited in path order, so the first error reported is always
  /// the one for the lowest path.
  pub fn try_map<E>(&self, mut transform: impl FnMut(&str, &[u8]) -> Result<Vec<u8>, E>) -> Result<Self, E> {
    let mut files = BTreeMap::new();
    for (path, contents) in self.files.iter() {
      let mapped = transform(path, contents)?;
      files.insert(path.clone(), Arc::from(mapped));
    }
    Ok(Self::from_map(files))
  }

  /// Merge labelled trees, failing on any path produced by two of them.
  ///
  /// The labels only feed error messages; the result does not depend on the
  /// order of the layers.
  pub fn merge<'a>(layers: impl IntoIterator<Item = (&'a str, &'a FileTree)>) -> Result<Self, TreeError> {
    let mut files: BTreeMap<String, Contents> = BTreeMap::new();
    let mut owners: BTreeMap<&str, &str> = BTreeMap::new();

    for (label, tree) in layers {
      for (path, contents) in tree.files.iter() {
        if let Some(first) = owners.get(path.as_str()) {
          return Err(TreeError::Conflict {
            path: path.clone(),
            first: first.to_string(),
            second: label.to_string(),
          });
        }
        owners.insert(path.as_str(), label);
        files.insert(path.clone(), contents.clone());
      }
    }

    Ok(Self::from_map(files))
  }

  /// Deterministic hash of the tree, comparable with `hash_directory` of the
  /// same content written to disk.
  pub fn content_hash(&self) -> ContentHash {
    hash_records(records_for_files(self.iter()))
  }
}

/// Incremental construction of a [`FileTree`].
#[derive(Debug, Default)]
pub struct TreeBuilder {
  files: BTreeMap<String, Contents>,
}

impl TreeBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a file.
  ///
  /// # Errors
  ///
  /// Fails on an invalid path or a path that was already added.
  pub fn add(&mut self, path: &str, contents: impl AsRef<[u8]>) -> Result<&mut Self, TreeError> {
    let path = normalize_path(path)?;
    if self.files.contains_key(&path) {
      return Err(TreeError::Duplicate(path));
    }
    self.files.insert(path, Arc::from(contents.as_ref()));
    Ok(self)
  }

  pub fn build(self) -> FileTree {
    FileTree::from_map(self.files)
  }
}
