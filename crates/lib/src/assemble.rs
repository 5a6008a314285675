//! Output assembly.
//!
//! The html, js, css and public trees are merged into the final application
//! tree. Each artifact is renamed to its configured output path first; any
//! path produced by two categories is a composition error.

use tracing::debug;

use crate::consts::{DEFAULT_CSS_OUTPUT, DEFAULT_HTML_OUTPUT, DEFAULT_JS_OUTPUT};
use crate::options::OutputPaths;
use crate::tree::{FileTree, TreeError};

/// Stage outputs that make up the application.
#[derive(Debug, Clone, Copy)]
pub struct Artifacts<'a> {
  pub html: &'a FileTree,
  pub js: &'a FileTree,
  /// `None` when the style stage did not run.
  pub css: Option<&'a FileTree>,
  pub public: &'a FileTree,
}

fn rename(tree: &FileTree, from: &str, to: &str) -> Result<FileTree, TreeError> {
  if from == to || !tree.contains(from) {
    return Ok(tree.clone());
  }
  tree.map_paths(|path| if path == from { to.to_string() } else { path.to_string() })
}

/// Merge the artifacts into the output tree.
///
/// # Errors
///
/// Returns `TreeError::Conflict` naming both categories when two of them
/// produce the same path.
pub fn assemble(artifacts: &Artifacts<'_>, paths: &OutputPaths) -> Result<FileTree, TreeError> {
  let html = rename(artifacts.html, DEFAULT_HTML_OUTPUT, &paths.html)?;
  let js = rename(artifacts.js, DEFAULT_JS_OUTPUT, &paths.js)?;
  let css = artifacts
    .css
    .map(|css| rename(css, DEFAULT_CSS_OUTPUT, &paths.css))
    .transpose()?
    .unwrap_or_default();

  let tree = FileTree::merge([
    ("html", &html),
    ("js", &js),
    ("css", &css),
    ("public", artifacts.public),
  ])?;

  debug!(
    files = tree.len(),
    html = html.len(),
    js = js.len(),
    css = css.len(),
    public = artifacts.public.len(),
    "assembled output"
  );
  Ok(tree)
}
