use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ConfigError;
use crate::consts::ENV_VAR;

/// Build environment.
///
/// The environment is resolved once, by whoever starts the build, and then
/// threaded read-only through the pipeline. Stages never consult the process
/// environment themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
  #[default]
  Development,
  Test,
  Production,
}

impl Environment {
  pub const ALL: [Environment; 3] = [Environment::Development, Environment::Test, Environment::Production];

  pub fn as_str(&self) -> &'static str {
    match self {
      Environment::Development => "development",
      Environment::Test => "test",
      Environment::Production => "production",
    }
  }

  pub fn is_production(&self) -> bool {
    matches!(self, Environment::Production)
  }

  /// Pick the environment: an explicit value wins, then the externally
  /// supplied override, then `development`. Empty strings count as unset.
  ///
  /// # Errors
  ///
  /// Returns `UnknownEnvironment` if the chosen value is not a known name.
  pub fn resolve(explicit: Option<&str>, external: Option<&str>) -> Result<Self, ConfigError> {
    let chosen = explicit
      .filter(|s| !s.is_empty())
      .or_else(|| external.filter(|s| !s.is_empty()));

    let env = match chosen {
      Some(name) => name.parse()?,
      None => Environment::default(),
    };
    debug!(environment = %env, explicit = explicit.is_some(), "resolved environment");
    Ok(env)
  }
}

/// Read the `ARBOR_ENV` override from the process environment.
///
/// Meant for binaries resolving the environment at startup; the library itself
/// never calls this during a build.
pub fn env_override() -> Option<String> {
  std::env::var(ENV_VAR).ok().filter(|s| !s.is_empty())
}

impl FromStr for Environment {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "development" => Ok(Environment::Development),
      "test" => Ok(Environment::Test),
      "production" => Ok(Environment::Production),
      other => Err(ConfigError::UnknownEnvironment(other.to_string())),
    }
  }
}

impl fmt::Display for Environment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
