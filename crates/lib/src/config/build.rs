use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Contents of `arbor.json`.
///
/// All paths are relative to the project root. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BuildConfig {
  #[serde(default)]
  pub trees: TreesConfig,
  #[serde(default)]
  pub output_paths: OutputPathsConfig,
  #[serde(default)]
  pub babel: PluginsConfig,
  #[serde(default)]
  pub rollup: PluginsConfig,
  /// Lua addon files, in hook order.
  #[serde(default)]
  pub addons: Vec<PathBuf>,
}

/// Directory overrides for the input trees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TreesConfig {
  pub src: Option<PathBuf>,
  pub styles: Option<PathBuf>,
  pub node_modules: Option<PathBuf>,
  pub public: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OutputPathsConfig {
  #[serde(default)]
  pub app: AppOutputPathsConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AppOutputPathsConfig {
  pub html: Option<String>,
  pub css: Option<String>,
  pub js: Option<String>,
}

/// Lua plugin files, applied in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PluginsConfig {
  #[serde(default)]
  pub plugins: Vec<PathBuf>,
}

impl BuildConfig {
  /// Load `arbor.json`, or defaults if the file does not exist.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    if !path.exists() {
      return Ok(Self::default());
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
      path: path.to_path_buf(),
      message: e.to_string(),
    })
  }
}
