//! Build options.
//!
//! [`BuildOptions`] is fixed at construction and read-only for the lifetime of
//! a build. Projects normally derive it from `arbor.json` (see
//! [`Project::build_options`](crate::project::Project::build_options)), but it
//! can be assembled directly, which is how in-memory builds are driven.

use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use crate::compile::SourcePlugin;
use crate::config::{ConfigError, Environment};
use crate::consts::{DEFAULT_CSS_OUTPUT, DEFAULT_HTML_OUTPUT, DEFAULT_JS_OUTPUT};
use crate::tree::{FileTree, TreeError, normalize_path};

/// Where an input tree comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeSource {
  /// A directory, loaded fresh for every build.
  Path(PathBuf),
  /// An in-memory tree.
  Tree(FileTree),
}

impl TreeSource {
  pub fn load(&self) -> Result<FileTree, TreeError> {
    match self {
      TreeSource::Path(path) => FileTree::from_dir(path),
      TreeSource::Tree(tree) => Ok(tree.clone()),
    }
  }

  /// Like `load`, but a missing directory is an empty tree.
  pub fn load_or_empty(&self) -> Result<FileTree, TreeError> {
    match self {
      TreeSource::Path(path) if !path.exists() => Ok(FileTree::new()),
      _ => self.load(),
    }
  }
}

impl From<FileTree> for TreeSource {
  fn from(tree: FileTree) -> Self {
    TreeSource::Tree(tree)
  }
}

impl From<PathBuf> for TreeSource {
  fn from(path: PathBuf) -> Self {
    TreeSource::Path(path)
  }
}

/// Overrides for the default input trees.
///
/// Unset roles fall back to the project layout: `src/`, `src/ui/styles/`,
/// `node_modules/` and `public/`.
#[derive(Debug, Clone, Default)]
pub struct TreeSources {
  pub src: Option<TreeSource>,
  pub styles: Option<TreeSource>,
  pub node_modules: Option<TreeSource>,
  pub public: Option<TreeSource>,
}

/// Output file names for the three application artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
  pub html: String,
  pub css: String,
  pub js: String,
}

impl Default for OutputPaths {
  fn default() -> Self {
    Self {
      html: DEFAULT_HTML_OUTPUT.to_string(),
      css: DEFAULT_CSS_OUTPUT.to_string(),
      js: DEFAULT_JS_OUTPUT.to_string(),
    }
  }
}

impl OutputPaths {
  /// Check every path is a valid relative file path, normalizing in place.
  pub fn validate(&mut self) -> Result<(), ConfigError> {
    for (category, path) in [("html", &mut self.html), ("css", &mut self.css), ("js", &mut self.js)] {
      let normalized = normalize_path(path).map_err(|e| ConfigError::InvalidOutputPath {
        category,
        path: path.clone(),
        reason: e.to_string(),
      })?;
      if path.ends_with('/') {
        return Err(ConfigError::InvalidOutputPath {
          category,
          path: path.clone(),
          reason: "must name a file".to_string(),
        });
      }
      *path = normalized;
    }
    Ok(())
  }
}

/// Per-file plugins for one compile step.
#[derive(Clone, Default)]
pub struct PluginOptions {
  pub plugins: Vec<Rc<dyn SourcePlugin>>,
}

impl fmt::Debug for PluginOptions {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.plugins.iter().map(|p| p.name())).finish()
  }
}

/// Whether addon `lintTree` hooks run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LintPolicy {
  Enabled,
  #[default]
  Disabled,
}

impl LintPolicy {
  pub fn is_enabled(&self) -> bool {
    matches!(self, LintPolicy::Enabled)
  }
}

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
  pub environment: Environment,
  pub trees: TreeSources,
  pub output_paths: OutputPaths,
  /// Applied to every script after transpilation, in order.
  pub babel: PluginOptions,
  /// Applied to every module at bundle time, in order.
  pub rollup: PluginOptions,
  pub lint: LintPolicy,
}
