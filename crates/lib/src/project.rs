//! The hosting project.
//!
//! A project is a directory with a `package.json` (whose `name` becomes the
//! application name) and, optionally, an `arbor.json` build config and a
//! `config/environment.json` application config.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::config::{AppConfig, BuildConfig, ConfigError, Environment};
use crate::consts::{APP_CONFIG_FILE, BUILD_CONFIG_FILE, NODE_MODULES_DIR, PACKAGE_FILE, PUBLIC_DIR, SRC_DIR};
use crate::lua::runtime::LuaHost;
use crate::lua::plugin::PluginError;
use crate::options::{BuildOptions, LintPolicy, OutputPaths, PluginOptions, TreeSource, TreeSources};

#[derive(Debug, Deserialize)]
struct PackageJson {
  name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Project {
  root: PathBuf,
  name: String,
  config: BuildConfig,
}

impl Project {
  /// Load the project at `root`.
  ///
  /// # Errors
  ///
  /// Fails if `package.json` is missing, malformed or has no usable `name`,
  /// or if `arbor.json` is malformed.
  pub fn load(root: &Path) -> Result<Self, ConfigError> {
    let root = dunce::canonicalize(root).map_err(|source| ConfigError::Read {
      path: root.to_path_buf(),
      source,
    })?;

    let package_path = root.join(PACKAGE_FILE);
    let content = fs::read_to_string(&package_path).map_err(|source| ConfigError::Read {
      path: package_path.clone(),
      source,
    })?;
    let package: PackageJson = serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
      path: package_path.clone(),
      message: e.to_string(),
    })?;
    let name = package.name.ok_or(ConfigError::MissingField {
      path: package_path,
      field: "name",
    })?;

    let config = BuildConfig::load(&root.join(BUILD_CONFIG_FILE))?;
    let project = Self::with_config(root, name, config)?;
    debug!(name = %project.name, root = %project.root.display(), "loaded project");
    Ok(project)
  }

  /// A project without reading anything from disk.
  pub fn new(root: impl Into<PathBuf>, name: impl Into<String>) -> Result<Self, ConfigError> {
    Self::with_config(root.into(), name.into(), BuildConfig::default())
  }

  fn with_config(root: PathBuf, name: String, config: BuildConfig) -> Result<Self, ConfigError> {
    if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c == '"' || c == '\'') {
      return Err(ConfigError::InvalidAppName(name));
    }
    Ok(Self { root, name, config })
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Application name, also the registry root name and module prefix.
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn config(&self) -> &BuildConfig {
    &self.config
  }

  /// Default source root, `<root>/src`.
  pub fn src_dir(&self) -> PathBuf {
    self.root.join(SRC_DIR)
  }

  /// Application config for `environment`.
  pub fn app_config(&self, environment: Environment) -> Result<AppConfig, ConfigError> {
    AppConfig::load(&self.root.join(APP_CONFIG_FILE), &self.name, environment)
  }

  fn resolve(&self, path: &Path) -> PathBuf {
    if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.root.join(path)
    }
  }

  /// Build options from `arbor.json`, with plugins loaded through `host`.
  pub fn build_options(
    &self,
    environment: Environment,
    lint: LintPolicy,
    host: &LuaHost,
  ) -> Result<BuildOptions, PluginError> {
    let trees = &self.config.trees;
    let app = &self.config.output_paths.app;
    let defaults = OutputPaths::default();

    Ok(BuildOptions {
      environment,
      trees: TreeSources {
        src: trees.src.as_deref().map(|p| TreeSource::Path(self.resolve(p))),
        styles: trees.styles.as_deref().map(|p| TreeSource::Path(self.resolve(p))),
        node_modules: Some(TreeSource::Path(
          self.resolve(trees.node_modules.as_deref().unwrap_or(Path::new(NODE_MODULES_DIR))),
        )),
        public: Some(TreeSource::Path(
          self.resolve(trees.public.as_deref().unwrap_or(Path::new(PUBLIC_DIR))),
        )),
      },
      output_paths: OutputPaths {
        html: app.html.clone().unwrap_or(defaults.html),
        css: app.css.clone().unwrap_or(defaults.css),
        js: app.js.clone().unwrap_or(defaults.js),
      },
      babel: PluginOptions {
        plugins: host.load_plugins(&self.config.babel.plugins)?,
      },
      rollup: PluginOptions {
        plugins: host.load_plugins(&self.config.rollup.plugins)?,
      },
      lint,
    })
  }
}
