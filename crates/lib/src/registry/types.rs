use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, trace};

use super::ResolverConfiguration;
use crate::compile::specifier_for;
use crate::tree::{FileTree, TreeError};

/// Errors raised while deriving the module registry.
#[derive(Debug, Error)]
pub enum RegistryError {
  #[error("ambiguous module registration: '{identifier}' is provided by both {first} and {second}")]
  Ambiguous {
    identifier: String,
    first: String,
    second: String,
  },

  #[error("'{0}' is generated by the module registry and must not exist in the source tree")]
  ReservedPath(String),

  #[error(transparent)]
  Tree(#[from] TreeError),
}

/// One registered module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleEntry {
  /// `<type>:/<rootName>/<name>`
  pub identifier: String,
  /// Source path without extension, e.g. `ui/components/foo-bar/component`.
  pub specifier: String,
}

/// Identifier → module mapping, sorted by identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleRegistry {
  entries: BTreeMap<String, ModuleEntry>,
}

impl ModuleRegistry {
  /// Classify every `.js` file in `tree`.
  ///
  /// # Errors
  ///
  /// Returns `Ambiguous` when two files map to the same identifier.
  pub fn build(tree: &FileTree, config: &ResolverConfiguration) -> Result<Self, RegistryError> {
    let mut entries: BTreeMap<String, ModuleEntry> = BTreeMap::new();

    for path in tree.paths() {
      let Some(identifier) = classify(path, config) else {
        continue;
      };
      let specifier = specifier_for(path).to_string();

      if let Some(existing) = entries.get(&identifier) {
        return Err(RegistryError::Ambiguous {
          identifier,
          first: format!("{}.js", existing.specifier),
          second: path.to_string(),
        });
      }

      trace!(identifier = %identifier, specifier = %specifier, "registered module");
      entries.insert(identifier.clone(), ModuleEntry { identifier, specifier });
    }

    debug!(modules = entries.len(), "built module registry");
    Ok(Self { entries })
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Specifier registered under `identifier`.
  pub fn get(&self, identifier: &str) -> Option<&str> {
    self.entries.get(identifier).map(|e| e.specifier.as_str())
  }

  /// Entries in identifier order.
  pub fn entries(&self) -> impl Iterator<Item = &ModuleEntry> {
    self.entries.values()
  }
}

/// Identifier for `path`, or `None` if the file is not a registered module.
pub fn classify(path: &str, config: &ResolverConfiguration) -> Option<String> {
  let stem = path.strip_suffix(".js")?;

  for (dir, collection) in config.scanned_collections() {
    let Some(rest) = stem.strip_prefix(&dir).and_then(|r| r.strip_prefix('/')) else {
      continue;
    };

    let segments: Vec<&str> = rest.split('/').collect();
    if segments.iter().any(|s| s.starts_with('-')) {
      trace!(path, "skipping private module");
      return None;
    }

    let (ty, name) = match segments.split_last() {
      Some((last, parents)) if !parents.is_empty() && collection.types.iter().any(|t| t == last) => {
        (last.to_string(), parents.join("/"))
      }
      _ => (collection.default_type.clone()?, rest.to_string()),
    };

    return Some(format!("{}:/{}/{}", ty, config.app.root_name, name));
  }

  None
}
