//! Types for pipeline composition and execution.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::addon::{AddonError, TreeType};
use crate::compile::TransformError;
use crate::config::ConfigError;
use crate::lua::plugin::PluginError;
use crate::registry::{ModuleRegistry, RegistryError};
use crate::tree::{FileTree, TreeError};

/// The fixed set of pipeline stages, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageName {
  TemplateCompile,
  ScriptCompile,
  ModuleRegistry,
  Bundle,
  Style,
  Html,
  Public,
}

impl StageName {
  pub fn as_str(&self) -> &'static str {
    match self {
      StageName::TemplateCompile => "template-compile",
      StageName::ScriptCompile => "script-compile",
      StageName::ModuleRegistry => "module-registry",
      StageName::Bundle => "bundle",
      StageName::Style => "style",
      StageName::Html => "html",
      StageName::Public => "public",
    }
  }
}

impl fmt::Display for StageName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Something a stage reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageInput {
  /// The full source tree.
  Source,
  Styles,
  NodeModules,
  /// The project's `public/` tree.
  Public,
  /// Another stage's output.
  Stage(StageName),
}

/// A stage declaration: its inputs and the addon hook points around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSpec {
  pub name: StageName,
  pub inputs: Vec<StageInput>,
  /// Tree type passed to `preprocessTree` before the transform.
  pub before: Option<TreeType>,
  /// Tree type passed to `postprocessTree` after the transform.
  pub after: Option<TreeType>,
}

/// Why a stage failed.
#[derive(Debug, Error)]
pub enum StageError {
  #[error(transparent)]
  Transform(#[from] TransformError),

  #[error(transparent)]
  Addon(#[from] AddonError),

  #[error(transparent)]
  Registry(#[from] RegistryError),

  #[error(transparent)]
  Tree(#[from] TreeError),

  #[error("missing required input '{0}'")]
  MissingInput(&'static str),
}

/// Errors that can occur while constructing or running a build.
#[derive(Debug, Error)]
pub enum BuildError {
  /// Missing source root, bad config file, unknown environment...
  #[error("configuration error: {0}")]
  Config(#[from] ConfigError),

  /// Addon registration failed (bad shape, duplicate name, load failure).
  #[error(transparent)]
  Addon(#[from] AddonError),

  #[error(transparent)]
  Plugin(#[from] PluginError),

  #[error("failed to start Lua runtime: {0}")]
  Lua(#[from] mlua::Error),

  /// An input tree could not be loaded.
  #[error("failed to load {role} tree: {source}")]
  Input {
    role: &'static str,
    #[source]
    source: TreeError,
  },

  #[error("stage '{stage}' depends on undeclared stage '{input}'")]
  UnknownStageInput { stage: StageName, input: StageName },

  #[error("stage '{0}' is declared more than once")]
  DuplicateStage(StageName),

  #[error("stage graph contains a cycle")]
  CycleDetected,

  /// A stage failed.
  #[error("stage '{stage}' failed: {source}")]
  Stage {
    stage: StageName,
    #[source]
    source: StageError,
  },

  /// Merging the final output failed.
  #[error("assembly failed: {0}")]
  Assemble(#[source] StageError),
}

impl BuildError {
  pub(crate) fn stage(stage: StageName) -> impl FnOnce(StageError) -> BuildError {
    move |source| BuildError::Stage { stage, source }
  }
}

/// Timing and size of one executed stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
  pub name: StageName,
  /// Files in the stage's output tree.
  pub files: usize,
  pub duration: Duration,
}

/// Everything a build produces.
#[derive(Debug, Clone)]
pub struct BuildOutput {
  /// The assembled application.
  pub tree: FileTree,
  /// Addon lint results; never part of `tree`.
  pub lint: FileTree,
  pub registry: ModuleRegistry,
  /// Executed stages in order.
  pub stages: Vec<StageReport>,
}
