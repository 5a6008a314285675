use std::collections::BTreeSet;

use tracing::{debug, info};

use super::{Addon, AddonError, HookKind, TreeContribution, TreeType};
use crate::tree::FileTree;

/// Ordered addon list with hook dispatch.
#[derive(Debug, Default)]
pub struct AddonRegistry {
  addons: Vec<Addon>,
}

impl AddonRegistry {
  /// Register addons in hook order.
  ///
  /// # Errors
  ///
  /// Returns `Duplicate` when two addons share a name.
  pub fn new(addons: Vec<Addon>) -> Result<Self, AddonError> {
    let mut names = BTreeSet::new();
    for addon in &addons {
      if !names.insert(addon.name()) {
        return Err(AddonError::Duplicate(addon.name().to_string()));
      }
    }
    debug!(addons = addons.len(), "registered addons");
    Ok(Self { addons })
  }

  pub fn len(&self) -> usize {
    self.addons.len()
  }

  pub fn is_empty(&self) -> bool {
    self.addons.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Addon> {
    self.addons.iter()
  }

  /// Thread `tree` through every addon's `preprocessTree`.
  pub fn preprocess_tree(&self, tree_type: TreeType, tree: FileTree) -> Result<FileTree, AddonError> {
    self.thread(HookKind::PreprocessTree, tree_type, tree)
  }

  /// Thread `tree` through every addon's `postprocessTree`.
  pub fn postprocess_tree(&self, tree_type: TreeType, tree: FileTree) -> Result<FileTree, AddonError> {
    self.thread(HookKind::PostprocessTree, tree_type, tree)
  }

  fn thread(&self, kind: HookKind, tree_type: TreeType, tree: FileTree) -> Result<FileTree, AddonError> {
    let mut tree = tree;
    for addon in &self.addons {
      let Some(hook) = addon.tree_hook(kind) else {
        continue;
      };

      debug!(addon = %addon.name(), hook = %kind, tree_type = %tree_type, "running hook");
      if let Some(replacement) = hook(tree_type, &tree).map_err(|source| AddonError::Hook {
        addon: addon.name().to_string(),
        hook: kind,
        tree_type,
        source,
      })? {
        tree = replacement;
      }
    }
    Ok(tree)
  }

  /// Collect every addon's `lintTree` results for `tree`.
  ///
  /// Each addon sees the same input; results are merged and never feed back
  /// into the build.
  ///
  /// # Errors
  ///
  /// Fails if a hook fails or two addons report the same lint path.
  pub fn lint_tree(&self, tree_type: TreeType, tree: &FileTree) -> Result<FileTree, AddonError> {
    let mut results: Vec<(String, FileTree)> = Vec::new();

    for addon in &self.addons {
      let Some(hook) = addon.tree_hook(HookKind::LintTree) else {
        continue;
      };

      debug!(addon = %addon.name(), tree_type = %tree_type, "running lint");
      let result = hook(tree_type, tree).map_err(|source| AddonError::Hook {
        addon: addon.name().to_string(),
        hook: HookKind::LintTree,
        tree_type,
        source,
      })?;
      if let Some(lint) = result {
        results.push((format!("addon '{}'", addon.name()), lint));
      }
    }

    let merged = FileTree::merge(results.iter().map(|(label, tree)| (label.as_str(), tree)))?;
    if !merged.is_empty() {
      info!(tree_type = %tree_type, results = merged.len(), "lint produced results");
    }
    Ok(merged)
  }

  /// Each addon's `treeFor` contribution, labelled and in declaration order.
  ///
  /// Path contributions are loaded from disk, relative to the addon root.
  pub fn tree_for(&self, tree_type: TreeType) -> Result<Vec<(String, FileTree)>, AddonError> {
    let mut contributions = Vec::new();

    for addon in &self.addons {
      let Some(hook) = addon.tree_for_hook() else {
        continue;
      };

      let contribution = hook(tree_type).map_err(|source| AddonError::Hook {
        addon: addon.name().to_string(),
        hook: HookKind::TreeFor,
        tree_type,
        source,
      })?;

      let tree = match contribution {
        None => continue,
        Some(TreeContribution::Tree(tree)) => tree,
        Some(TreeContribution::Path(path)) => {
          let dir = if path.is_absolute() { path } else { addon.root().join(path) };
          FileTree::from_dir(&dir).map_err(|source| AddonError::Contribution {
            addon: addon.name().to_string(),
            hook: HookKind::TreeFor,
            tree_type,
            source,
          })?
        }
      };

      debug!(addon = %addon.name(), tree_type = %tree_type, files = tree.len(), "addon contributed tree");
      contributions.push((format!("addon '{}'", addon.name()), tree));
    }

    Ok(contributions)
  }
}
