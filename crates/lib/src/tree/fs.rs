//! Loading trees from disk and writing them back atomically.

use std::fs;
use std::path::Path;

use tracing::{debug, trace};
use walkdir::WalkDir;

use super::types::{FileTree, TreeBuilder, TreeError};

impl FileTree {
  /// Load every file under `dir`.
  ///
  /// Entries are visited in file-name order and symlinks are followed.
  /// Directories contribute nothing on their own, so an empty directory
  /// loads as an empty tree.
  ///
  /// # Errors
  ///
  /// Fails if `dir` is not a directory or any entry cannot be read.
  pub fn from_dir(dir: &Path) -> Result<Self, TreeError> {
    if !dir.is_dir() {
      return Err(TreeError::NotADirectory(dir.to_path_buf()));
    }

    let mut builder = TreeBuilder::new();
    let walker = WalkDir::new(dir).follow_links(true).sort_by_file_name();

    for entry in walker {
      let entry = entry.map_err(|e| TreeError::Walk {
        path: dir.to_path_buf(),
        message: e.to_string(),
      })?;

      if !entry.file_type().is_file() {
        continue;
      }

      let entry_path = entry.path();
      let rel_path = entry_path.strip_prefix(dir).unwrap_or(entry_path).to_string_lossy();
      let contents = fs::read(entry_path).map_err(|source| TreeError::Read {
        path: entry_path.to_path_buf(),
        source,
      })?;

      trace!(path = %rel_path, bytes = contents.len(), "loaded file");
      builder.add(&rel_path, contents)?;
    }

    let tree = builder.build();
    debug!(dir = %dir.display(), files = tree.len(), "loaded tree");
    Ok(tree)
  }

  /// Write the tree to `dest`, replacing whatever is there.
  ///
  /// The tree is first written into a temporary sibling of `dest` and then
  /// renamed into place, so a failure part-way through leaves the previous
  /// contents of `dest` intact.
  pub fn write_to(&self, dest: &Path) -> Result<(), TreeError> {
    let parent = match dest.parent() {
      Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
      _ => Path::new(".").to_path_buf(),
    };
    let write_err = |path: &Path| {
      let path = path.to_path_buf();
      move |source| TreeError::Write { path, source }
    };

    fs::create_dir_all(&parent).map_err(write_err(&parent))?;

    let staging = tempfile::Builder::new()
      .prefix(".arbor-staging-")
      .tempdir_in(&parent)
      .map_err(write_err(&parent))?;

    for (path, contents) in self.iter() {
      let target = staging.path().join(path);
      if let Some(dir) = target.parent() {
        fs::create_dir_all(dir).map_err(write_err(dir))?;
      }
      fs::write(&target, contents).map_err(write_err(&target))?;
    }

    // The previous output is parked inside a temp dir so it is cleaned up on drop.
    let previous = tempfile::Builder::new()
      .prefix(".arbor-previous-")
      .tempdir_in(&parent)
      .map_err(write_err(&parent))?;
    let parked = previous.path().join("output");

    let had_previous = dest.exists();
    if had_previous {
      fs::rename(dest, &parked).map_err(write_err(dest))?;
    }

    if let Err(source) = fs::rename(staging.path(), dest) {
      if had_previous {
        let _ = fs::rename(&parked, dest);
      }
      return Err(TreeError::Write {
        path: dest.to_path_buf(),
        source,
      });
    }

    debug!(dest = %dest.display(), files = self.len(), "wrote tree");
    Ok(())
  }
}
