//! Build pipeline.
//!
//! A [`Builder`] is constructed once from a project, its options and its
//! addons; every configuration error surfaces there. [`Builder::build`] then
//! loads the input trees fresh, orders the stages (see [`dag`]), runs them one
//! after another and assembles the result:
//!
//! ```text
//! src ──► template-compile ──► script-compile ──► module-registry ──► bundle ─┐
//! styles ──► style ───────────────────────────────────────────────────────────┤
//! src/ui/index.html ──► html ─────────────────────────────────────────────────┼──► assemble ──► postprocessTree("all")
//! public + addon treeFor("public") ──► public ────────────────────────────────┘
//! ```
//!
//! Nothing is cached between builds, so two builds of the same inputs give
//! byte-identical output.

pub mod dag;
mod stages;
pub mod types;

use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use crate::addon::{Addon, AddonRegistry, TreeType};
use crate::assemble::{Artifacts, assemble};
use crate::compile::Toolchain;
use crate::config::{AppConfig, ConfigError, Environment};
use crate::consts::STYLES_DIR;
use crate::lua::runtime::LuaHost;
use crate::options::{BuildOptions, LintPolicy, TreeSource};
use crate::project::Project;
use crate::registry::{ModuleRegistry, ResolverConfiguration};
use crate::tree::FileTree;

pub use dag::{StageGraph, standard_stages};
pub use types::*;

/// Input trees, loaded once per build.
#[derive(Debug)]
struct Inputs {
  src: FileTree,
  styles: FileTree,
  node_modules: FileTree,
  public: FileTree,
}

/// State accumulated while stages run.
#[derive(Debug, Default)]
struct Run {
  outputs: HashMap<StageName, FileTree>,
  lint: Vec<(String, FileTree)>,
  registry: Option<ModuleRegistry>,
  reports: Vec<StageReport>,
}

impl Run {
  fn output(&self, stage: StageName) -> Result<&FileTree, StageError> {
    self
      .outputs
      .get(&stage)
      .ok_or(StageError::MissingInput(stage.as_str()))
  }
}

/// Builds one project's application bundle.
#[derive(Debug)]
pub struct Builder {
  project: Project,
  options: BuildOptions,
  src: TreeSource,
  addons: AddonRegistry,
  app_config: AppConfig,
  resolver_config: ResolverConfiguration,
  toolchain: Toolchain,
}

impl Builder {
  /// Create a builder.
  ///
  /// # Errors
  ///
  /// Fails with a configuration error if the source root does not exist, an
  /// output path is invalid or the application config cannot be loaded, and
  /// with an addon error if two addons share a name.
  pub fn new(project: Project, options: BuildOptions, addons: Vec<Addon>) -> Result<Self, BuildError> {
    let mut options = options;
    options.output_paths.validate()?;

    let src = options
      .trees
      .src
      .clone()
      .unwrap_or_else(|| TreeSource::Path(project.src_dir()));
    if let TreeSource::Path(path) = &src
      && !path.is_dir()
    {
      return Err(ConfigError::MissingSourceRoot(path.clone()).into());
    }

    let addons = AddonRegistry::new(addons)?;
    let app_config = project.app_config(options.environment)?;
    let resolver_config = ResolverConfiguration::new(project.name());

    debug!(
      app = %project.name(),
      environment = %options.environment,
      addons = addons.len(),
      lint = options.lint.is_enabled(),
      "created builder"
    );

    Ok(Self {
      project,
      options,
      src,
      addons,
      app_config,
      resolver_config,
      toolchain: Toolchain::default(),
    })
  }

  /// Load the project at `root` with its configured addons and plugins.
  pub fn from_project(root: &Path, environment: Environment, lint: LintPolicy) -> Result<Self, BuildError> {
    let project = Project::load(root)?;
    let host = LuaHost::new(project.root())?;
    let addons = host.load_addons(&project.config().addons)?;
    let options = project.build_options(environment, lint, &host)?;
    Self::new(project, options, addons)
  }

  /// Replace the default compilers.
  pub fn with_toolchain(mut self, toolchain: Toolchain) -> Self {
    self.toolchain = toolchain;
    self
  }

  pub fn project(&self) -> &Project {
    &self.project
  }

  pub fn options(&self) -> &BuildOptions {
    &self.options
  }

  pub fn app_config(&self) -> &AppConfig {
    &self.app_config
  }

  pub fn resolver_config(&self) -> &ResolverConfiguration {
    &self.resolver_config
  }

  /// Directory sources are read from; `None` for in-memory sources.
  pub fn source_dir(&self) -> Option<&Path> {
    match &self.src {
      TreeSource::Path(path) => Some(path),
      TreeSource::Tree(_) => None,
    }
  }

  fn load_inputs(&self) -> Result<Inputs, BuildError> {
    let input = |role: &'static str| move |source| BuildError::Input { role, source };

    let src = self.src.load().map_err(input("source"))?;
    let styles = match &self.options.trees.styles {
      Some(styles) => styles.load_or_empty().map_err(input("styles"))?,
      None => src.select(STYLES_DIR),
    };
    let node_modules = match &self.options.trees.node_modules {
      Some(tree) => tree.load_or_empty().map_err(input("node_modules"))?,
      None => FileTree::new(),
    };
    let public = match &self.options.trees.public {
      Some(tree) => tree.load_or_empty().map_err(input("public"))?,
      None => FileTree::new(),
    };

    debug!(
      src = src.len(),
      styles = styles.len(),
      node_modules = node_modules.len(),
      public = public.len(),
      "loaded input trees"
    );
    Ok(Inputs {
      src,
      styles,
      node_modules,
      public,
    })
  }

  /// Run stages in order, stopping after `last` if given.
  fn run(&self, inputs: &Inputs, last: Option<StageName>) -> Result<Run, BuildError> {
    let graph = StageGraph::new(standard_stages(!inputs.styles.is_empty()))?;
    let mut run = Run::default();

    for spec in graph.order() {
      let started = Instant::now();
      debug!(stage = %spec.name, "running stage");

      let tree = self.run_stage(spec, inputs, &mut run).map_err(BuildError::stage(spec.name))?;

      let duration = started.elapsed();
      info!(stage = %spec.name, files = tree.len(), elapsed = ?duration, "stage finished");
      run.reports.push(StageReport {
        name: spec.name,
        files: tree.len(),
        duration,
      });
      run.outputs.insert(spec.name, tree);

      if last == Some(spec.name) {
        break;
      }
    }

    Ok(run)
  }

  /// Build the application.
  ///
  /// # Errors
  ///
  /// The first failing stage aborts the build; the error names the stage.
  pub fn build(&self) -> Result<BuildOutput, BuildError> {
    let started = Instant::now();
    info!(app = %self.project.name(), environment = %self.options.environment, "starting build");

    let inputs = self.load_inputs()?;
    let mut run = self.run(&inputs, None)?;

    let empty = FileTree::new();
    let artifacts = Artifacts {
      html: run.outputs.get(&StageName::Html).unwrap_or(&empty),
      js: run.outputs.get(&StageName::Bundle).unwrap_or(&empty),
      css: run.outputs.get(&StageName::Style),
      public: run.outputs.get(&StageName::Public).unwrap_or(&empty),
    };
    let tree = assemble(&artifacts, &self.options.output_paths).map_err(|e| BuildError::Assemble(e.into()))?;
    let tree = self
      .addons
      .postprocess_tree(TreeType::All, tree)
      .map_err(|e| BuildError::Assemble(e.into()))?;

    let lint = FileTree::merge(run.lint.iter().map(|(label, tree)| (label.as_str(), tree)))
      .map_err(|e| BuildError::Assemble(e.into()))?;

    info!(
      files = tree.len(),
      lint = lint.len(),
      elapsed = ?started.elapsed(),
      "build complete"
    );

    Ok(BuildOutput {
      tree,
      lint,
      registry: run.registry.take().unwrap_or_default(),
      stages: run.reports,
    })
  }

  /// Derive the module registry without bundling or assembling.
  pub fn registry(&self) -> Result<ModuleRegistry, BuildError> {
    let inputs = self.load_inputs()?;
    let mut run = self.run(&inputs, Some(StageName::ModuleRegistry))?;
    Ok(run.registry.take().unwrap_or_default())
  }
}
