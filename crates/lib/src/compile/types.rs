use std::fmt;

use thiserror::Error;

use crate::tree::FileTree;

use super::{AmdBundler, ConcatStyleCompiler, ModuleTemplateCompiler, PassthroughTranspiler};

/// Errors reported by compiler collaborators and plugins.
///
/// Every variant carries the path of the file being processed; the pipeline
/// adds the stage name when it propagates the error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
  #[error("{path}: {message}")]
  Failed { path: String, message: String },

  #[error("{path}: file is not valid UTF-8")]
  NotUtf8 { path: String },

  #[error("{path}: unknown feature flag '{flag}'")]
  UnknownFeature { path: String, flag: String },

  #[error("{path}: '{name}' is not exported by '{module}'")]
  UnknownMacro { path: String, module: String, name: String },

  #[error("{path}: syntax error: {message}")]
  Syntax { path: String, message: String },

  #[error("{path}: plugin '{plugin}' failed: {message}")]
  Plugin {
    path: String,
    plugin: String,
    message: String,
  },

  #[error("{path}: cannot resolve package '{package}'")]
  UnresolvedPackage { path: String, package: String },
}

impl TransformError {
  pub fn failed(path: impl Into<String>, message: impl fmt::Display) -> Self {
    TransformError::Failed {
      path: path.into(),
      message: message.to_string(),
    }
  }
}

/// Decode a file as UTF-8 or report which file was not.
pub fn source_text<'a>(path: &str, bytes: &'a [u8]) -> Result<&'a str, TransformError> {
  std::str::from_utf8(bytes).map_err(|_| TransformError::NotUtf8 { path: path.to_string() })
}

/// Compiles one `*.hbs` template into an ES module.
///
/// Implementations must be pure; templates are compiled in parallel.
pub trait TemplateCompiler: Send + Sync {
  /// `path` is the template's path in the source tree, `specifier` the same
  /// path without extension.
  fn compile(&self, path: &str, specifier: &str, source: &str) -> Result<String, TransformError>;
}

/// Turns one source script into a plain ES module.
pub trait ScriptTranspiler {
  /// Returns the output path and source. Returning a different path renames
  /// the file (`foo.ts` → `foo.js`).
  fn transpile(&self, path: &str, source: &str) -> Result<(String, String), TransformError>;
}

/// What the bundle stage hands to the [`Bundler`].
pub struct BundleInput<'a> {
  /// Application name; module ids are `<app_name>/<specifier>`.
  pub app_name: &'a str,
  /// Script-compile output plus the generated registry modules.
  pub modules: &'a FileTree,
  /// Installed packages, rooted at the `node_modules` directory.
  pub node_modules: &'a FileTree,
  /// Bundle-time plugins, applied to every module in order.
  pub plugins: &'a [std::rc::Rc<dyn SourcePlugin>],
}

/// Combines application modules and their dependencies into output files.
pub trait Bundler {
  /// The main bundle belongs at `app.js` in the returned tree; the assembler
  /// moves it to the configured output path. Returning an empty tree means
  /// there was nothing to bundle.
  fn bundle(&self, input: &BundleInput<'_>) -> Result<FileTree, TransformError>;
}

/// Compiles the styles tree into one stylesheet.
pub trait StyleCompiler {
  /// `None` means the tree held nothing to compile; no stylesheet is emitted.
  fn compile(&self, styles: &FileTree) -> Result<Option<String>, TransformError>;
}

/// A per-file source transform (babel plugins at script-compile, rollup
/// plugins at bundle time).
pub trait SourcePlugin {
  fn name(&self) -> &str;

  /// Returns `Ok(None)` to leave the code unchanged.
  fn transform(&self, path: &str, code: &str) -> Result<Option<String>, TransformError>;
}

/// Run `plugins` over `code` in order, each seeing the previous output.
pub fn apply_plugins(
  plugins: &[std::rc::Rc<dyn SourcePlugin>],
  path: &str,
  code: String,
) -> Result<String, TransformError> {
  let mut code = code;
  for plugin in plugins {
    if let Some(transformed) = plugin.transform(path, &code)? {
      code = transformed;
    }
  }
  Ok(code)
}

/// The set of collaborators a build uses.
pub struct Toolchain {
  pub templates: Box<dyn TemplateCompiler>,
  pub transpiler: Box<dyn ScriptTranspiler>,
  pub bundler: Box<dyn Bundler>,
  pub styles: Box<dyn StyleCompiler>,
}

impl Default for Toolchain {
  fn default() -> Self {
    Self {
      templates: Box::new(ModuleTemplateCompiler),
      transpiler: Box::new(PassthroughTranspiler),
      bundler: Box::new(AmdBundler),
      styles: Box::new(ConcatStyleCompiler),
    }
  }
}

impl fmt::Debug for Toolchain {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Toolchain").finish_non_exhaustive()
  }
}
