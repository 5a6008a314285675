use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::tree::{FileTree, TreeError};

/// The kind of tree a hook is invoked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeType {
  /// The full source tree (lint only).
  Src,
  /// Compiled templates (lint only).
  Templates,
  Template,
  Js,
  Css,
  Html,
  Public,
  /// The assembled output.
  All,
}

impl TreeType {
  pub fn as_str(&self) -> &'static str {
    match self {
      TreeType::Src => "src",
      TreeType::Templates => "templates",
      TreeType::Template => "template",
      TreeType::Js => "js",
      TreeType::Css => "css",
      TreeType::Html => "html",
      TreeType::Public => "public",
      TreeType::All => "all",
    }
  }
}

impl fmt::Display for TreeType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Which hook is being dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
  PreprocessTree,
  PostprocessTree,
  LintTree,
  TreeFor,
}

impl HookKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      HookKind::PreprocessTree => "preprocessTree",
      HookKind::PostprocessTree => "postprocessTree",
      HookKind::LintTree => "lintTree",
      HookKind::TreeFor => "treeFor",
    }
  }
}

impl fmt::Display for HookKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A failure inside a hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
  #[error("{0}")]
  Failed(String),

  #[error("expected {expected}, got {found}")]
  InvalidReturn { expected: &'static str, found: String },
}

/// What `treeFor` may contribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeContribution {
  /// A directory, resolved against the addon root when relative.
  Path(PathBuf),
  Tree(FileTree),
}

/// Errors raised by addon registration and dispatch.
#[derive(Debug, Error)]
pub enum AddonError {
  #[error("addon name must be a non-empty string")]
  EmptyName,

  #[error("duplicate addon name '{0}'")]
  Duplicate(String),

  #[error("invalid addon {}: {message}", path.display())]
  InvalidShape { path: PathBuf, message: String },

  #[error("failed to load addon {}: {message}", path.display())]
  Load { path: PathBuf, message: String },

  #[error("addon '{addon}' {hook}(\"{tree_type}\") failed: {source}")]
  Hook {
    addon: String,
    hook: HookKind,
    tree_type: TreeType,
    #[source]
    source: HookError,
  },

  #[error("addon '{addon}' {hook}(\"{tree_type}\") contribution could not be loaded: {source}")]
  Contribution {
    addon: String,
    hook: HookKind,
    tree_type: TreeType,
    #[source]
    source: TreeError,
  },

  #[error(transparent)]
  Tree(#[from] TreeError),
}

/// `preprocessTree`, `postprocessTree` and `lintTree` share this shape.
/// `Ok(None)` leaves the tree unchanged.
pub type TreeHook = Box<dyn Fn(TreeType, &FileTree) -> Result<Option<FileTree>, HookError>>;

/// `treeFor`. `Ok(None)` contributes nothing.
pub type TreeForHook = Box<dyn Fn(TreeType) -> Result<Option<TreeContribution>, HookError>>;

/// A validated addon record.
///
/// Hooks are explicit optional fields; a missing hook is a no-op at dispatch.
pub struct Addon {
  name: String,
  root: PathBuf,
  preprocess_tree: Option<TreeHook>,
  postprocess_tree: Option<TreeHook>,
  lint_tree: Option<TreeHook>,
  tree_for: Option<TreeForHook>,
}

impl Addon {
  /// A new addon without hooks.
  ///
  /// # Errors
  ///
  /// Returns `EmptyName` for a blank name.
  pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Result<Self, AddonError> {
    let name = name.into();
    if name.trim().is_empty() {
      return Err(AddonError::EmptyName);
    }
    Ok(Self {
      name,
      root: root.into(),
      preprocess_tree: None,
      postprocess_tree: None,
      lint_tree: None,
      tree_for: None,
    })
  }

  pub fn with_preprocess_tree(
    mut self,
    hook: impl Fn(TreeType, &FileTree) -> Result<Option<FileTree>, HookError> + 'static,
  ) -> Self {
    self.preprocess_tree = Some(Box::new(hook));
    self
  }

  pub fn with_postprocess_tree(
    mut self,
    hook: impl Fn(TreeType, &FileTree) -> Result<Option<FileTree>, HookError> + 'static,
  ) -> Self {
    self.postprocess_tree = Some(Box::new(hook));
    self
  }

  pub fn with_lint_tree(
    mut self,
    hook: impl Fn(TreeType, &FileTree) -> Result<Option<FileTree>, HookError> + 'static,
  ) -> Self {
    self.lint_tree = Some(Box::new(hook));
    self
  }

  pub fn with_tree_for(
    mut self,
    hook: impl Fn(TreeType) -> Result<Option<TreeContribution>, HookError> + 'static,
  ) -> Self {
    self.tree_for = Some(Box::new(hook));
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Directory `treeFor` paths are resolved against.
  pub fn root(&self) -> &Path {
    &self.root
  }

  pub(crate) fn tree_hook(&self, kind: HookKind) -> Option<&TreeHook> {
    match kind {
      HookKind::PreprocessTree => self.preprocess_tree.as_ref(),
      HookKind::PostprocessTree => self.postprocess_tree.as_ref(),
      HookKind::LintTree => self.lint_tree.as_ref(),
      HookKind::TreeFor => None,
    }
  }

  pub(crate) fn tree_for_hook(&self) -> Option<&TreeForHook> {
    self.tree_for.as_ref()
  }

  /// Names of the hooks this addon provides.
  pub fn hooks(&self) -> Vec<HookKind> {
    let mut hooks = Vec::new();
    if self.preprocess_tree.is_some() {
      hooks.push(HookKind::PreprocessTree);
    }
    if self.postprocess_tree.is_some() {
      hooks.push(HookKind::PostprocessTree);
    }
    if self.lint_tree.is_some() {
      hooks.push(HookKind::LintTree);
    }
    if self.tree_for.is_some() {
      hooks.push(HookKind::TreeFor);
    }
    hooks
  }
}

impl fmt::Debug for Addon {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Addon")
      .field("name", &self.name)
      .field("root", &self.root)
      .field("hooks", &self.hooks())
      .finish()
  }
}
