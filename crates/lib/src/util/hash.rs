//! Hashing utilities for output comparison and content-derived ids.
//!
//! This module provides:
//! - `ContentHash`: a full 64-character SHA-256 hash
//! - `hash_directory()`: deterministic hashing of an on-disk directory
//! - `hash_records()`: the record format shared with in-memory trees
//! - `hash_bytes()`: arbitrary byte hashing

use std::collections::BTreeSet;
use std::fs;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::consts::OBJ_HASH_PREFIX_LEN;

/// A full 64-character SHA-256 hash.
///
/// # Format
///
/// The hash is a lowercase hexadecimal string (64 characters).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
  /// The truncated form used where a readable id is enough (template ids).
  pub fn short(&self) -> &str {
    &self.0[..OBJ_HASH_PREFIX_LEN.min(self.0.len())]
  }
}

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Error during directory hashing.
#[derive(Debug, thiserror::Error)]
pub enum DirHashError {
  #[error("failed to walk directory: {message}")]
  WalkDir { message: String },

  #[error("failed to read file {path}: {message}")]
  ReadFile { path: String, message: String },
}

/// One entry of a hashed tree: either a directory or a file with its content hash.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum HashRecord {
  Dir(String),
  File(String, ContentHash),
}

impl HashRecord {
  fn path(&self) -> &str {
    match self {
      HashRecord::Dir(path) | HashRecord::File(path, _) => path,
    }
  }

  fn line(&self) -> String {
    match self {
      HashRecord::Dir(path) => format!("D:{}", path),
      HashRecord::File(path, hash) => format!("F:{}:{}", path, hash.0),
    }
  }
}

/// Hash a set of records.
///
/// Records are sorted by path so the result does not depend on discovery order.
/// `FileTree::content_hash` and `hash_directory` both reduce to this function,
/// which makes an in-memory tree comparable with what is already on disk.
pub fn hash_records(mut records: Vec<HashRecord>) -> ContentHash {
  records.sort_by(|a, b| a.path().cmp(b.path()));

  let mut hasher = Sha256::new();
  for record in records {
    hasher.update(record.line().as_bytes());
    hasher.update(b"\n");
  }

  ContentHash(hex::encode(hasher.finalize()))
}

/// Build the records for a list of `/`-separated file paths and their contents.
///
/// Every ancestor directory of every file gets a `Dir` record, mirroring what a
/// directory walk reports.
pub fn records_for_files<'a>(files: impl IntoIterator<Item = (&'a str, &'a [u8])>) -> Vec<HashRecord> {
  let mut dirs = BTreeSet::new();
  let mut records = Vec::new();

  for (path, contents) in files {
    let mut end = 0;
    while let Some(offset) = path[end..].find('/') {
      end += offset;
      dirs.insert(path[..end].to_string());
      end += 1;
    }
    records.push(HashRecord::File(path.to_string(), hash_bytes(contents)));
  }

  records.extend(dirs.into_iter().map(HashRecord::Dir));
  records
}

/// Compute a deterministic hash of a directory's contents.
///
/// The hash includes file contents and directory structure, not metadata like
/// timestamps or permissions. Symlinks are followed.
///
/// # Arguments
///
/// * `path` - The directory to hash
/// * `exclude` - List of file/directory names to skip
pub fn hash_directory(path: &Path, exclude: &[&str]) -> Result<ContentHash, DirHashError> {
  let mut records = Vec::new();

  let walker = WalkDir::new(path)
    .follow_links(true)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|e| {
      e.file_name()
        .to_str()
        .map(|name| !exclude.contains(&name))
        .unwrap_or(true)
    });

  for entry in walker {
    let entry = entry.map_err(|e| DirHashError::WalkDir { message: e.to_string() })?;
    let entry_path = entry.path();

    let rel_path = entry_path
      .strip_prefix(path)
      .unwrap_or(entry_path)
      .to_string_lossy()
      .replace('\\', "/");

    // Skip the root directory itself
    if rel_path.is_empty() {
      continue;
    }

    let file_type = entry.file_type();
    if file_type.is_file() {
      records.push(HashRecord::File(rel_path, hash_file(entry_path)?));
    } else if file_type.is_dir() {
      records.push(HashRecord::Dir(rel_path));
    }
  }

  Ok(hash_records(records))
}

/// Hash a file's contents.
pub fn hash_file(path: &Path) -> Result<ContentHash, DirHashError> {
  let mut file = fs::File::open(path).map_err(|e| DirHashError::ReadFile {
    path: path.display().to_string(),
    message: e.to_string(),
  })?;

  let mut hasher = Sha256::new();
  let mut buffer = [0u8; 8192];

  loop {
    let bytes_read = file.read(&mut buffer).map_err(|e| DirHashError::ReadFile {
      path: path.display().to_string(),
      message: e.to_string(),
    })?;
    if bytes_read == 0 {
      break;
    }
    hasher.update(&buffer[..bytes_read]);
  }

  Ok(ContentHash(hex::encode(hasher.finalize())))
}

/// Hash arbitrary bytes.
pub fn hash_bytes(data: &[u8]) -> ContentHash {
  let mut hasher = Sha256::new();
  hasher.update(data);
  ContentHash(hex::encode(hasher.finalize()))
}
