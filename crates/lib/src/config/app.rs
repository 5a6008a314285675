use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::{ConfigError, Environment};
use crate::consts::DEFAULT_ROOT_URL;
use crate::placeholder::Resolver;

const RESERVED_KEYS: [&str; 2] = ["modulePrefix", "environment"];

/// Resolved application configuration for one environment.
///
/// This is what application code sees as `config/environment.js` and what the
/// html stage substitutes into `index.html`.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
  pub module_prefix: String,
  pub environment: Environment,
  pub root_url: String,
  pub feature_flags: BTreeMap<String, bool>,
  /// Keys the build does not interpret, passed through to application code.
  pub extra: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAppConfig {
  #[serde(rename = "rootURL")]
  root_url: Option<String>,
  #[serde(default)]
  feature_flags: BTreeMap<String, bool>,
  #[serde(default)]
  environments: BTreeMap<String, RawOverride>,
  #[serde(flatten)]
  extra: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOverride {
  #[serde(rename = "rootURL")]
  root_url: Option<String>,
  #[serde(default)]
  feature_flags: BTreeMap<String, bool>,
  #[serde(flatten)]
  extra: Map<String, Value>,
}

impl AppConfig {
  /// Defaults: root URL `/`, no feature flags, no extra keys.
  pub fn new(module_prefix: impl Into<String>, environment: Environment) -> Self {
    Self {
      module_prefix: module_prefix.into(),
      environment,
      root_url: DEFAULT_ROOT_URL.to_string(),
      feature_flags: BTreeMap::new(),
      extra: Map::new(),
    }
  }

  /// Load `path` if it exists, otherwise fall back to defaults.
  pub fn load(path: &Path, module_prefix: &str, environment: Environment) -> Result<Self, ConfigError> {
    if !path.exists() {
      debug!(path = %path.display(), "no application config, using defaults");
      return Ok(Self::new(module_prefix, environment));
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    Self::from_json(&content, module_prefix, environment).map_err(|e| match e {
      ConfigError::Parse { message, .. } => ConfigError::Parse {
        path: path.to_path_buf(),
        message,
      },
      other => other,
    })
  }

  /// Parse the application config and apply the override for `environment`.
  ///
  /// Overrides replace `rootURL` and extra keys, and merge feature flags
  /// key-wise over the base set.
  pub fn from_json(content: &str, module_prefix: &str, environment: Environment) -> Result<Self, ConfigError> {
    let raw: RawAppConfig = serde_json::from_str(content).map_err(|e| ConfigError::Parse {
      path: Path::new("<application config>").to_path_buf(),
      message: e.to_string(),
    })?;

    for name in raw.environments.keys() {
      name.parse::<Environment>()?;
    }

    let mut config = Self::new(module_prefix, environment);
    config.apply(raw.root_url, raw.feature_flags, raw.extra)?;

    if let Some(over) = raw.environments.into_iter().find_map(|(name, over)| {
      (name == environment.as_str()).then_some(over)
    }) {
      config.apply(over.root_url, over.feature_flags, over.extra)?;
    }

    debug!(
      environment = %environment,
      root_url = %config.root_url,
      flags = config.feature_flags.len(),
      "loaded application config"
    );
    Ok(config)
  }

  fn apply(
    &mut self,
    root_url: Option<String>,
    flags: BTreeMap<String, bool>,
    extra: Map<String, Value>,
  ) -> Result<(), ConfigError> {
    if let Some(root_url) = root_url {
      if !root_url.starts_with('/') || !root_url.ends_with('/') {
        return Err(ConfigError::InvalidRootUrl(root_url));
      }
      self.root_url = root_url;
    }

    self.feature_flags.extend(flags);

    for (key, value) in extra {
      if RESERVED_KEYS.contains(&key.as_str()) {
        return Err(ConfigError::ReservedKey(key));
      }
      self.extra.insert(key, value);
    }

    Ok(())
  }

  /// The config as a JSON object, the shape application code imports.
  pub fn to_json(&self) -> Value {
    let mut object = self.extra.clone();
    object.insert("modulePrefix".to_string(), Value::from(self.module_prefix.clone()));
    object.insert("environment".to_string(), Value::from(self.environment.as_str()));
    object.insert("rootURL".to_string(), Value::from(self.root_url.clone()));
    object.insert(
      "featureFlags".to_string(),
      Value::Object(
        self
          .feature_flags
          .iter()
          .map(|(name, enabled)| (name.clone(), Value::Bool(*enabled)))
          .collect(),
      ),
    );
    Value::Object(object)
  }

  /// `config/environment.js`.
  pub fn to_module_source(&self) -> String {
    // Serializing a `Value` cannot fail.
    let json = serde_json::to_string_pretty(&self.to_json()).unwrap_or_else(|_| "{}".to_string());
    format!("export default {};\n", json)
  }
}

impl Resolver for AppConfig {
  fn resolve_root_url(&self) -> &str {
    &self.root_url
  }

  fn resolve_module_prefix(&self) -> &str {
    &self.module_prefix
  }

  fn resolve_environment(&self) -> &str {
    self.environment.as_str()
  }
}
