//! Environment and configuration resolution.
//!
//! Three inputs shape a build besides the source tree:
//! - the [`Environment`], resolved once by the caller
//! - the application config (`config/environment.json`), see [`AppConfig`]
//! - the build config (`arbor.json`), see [`BuildConfig`]

mod app;
mod build;
mod environment;

use std::path::PathBuf;

use thiserror::Error;

pub use app::*;
pub use build::*;
pub use environment::*;

/// Errors raised while resolving configuration. All of them are fatal and
/// surface before any stage runs.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("unknown environment '{0}' (expected development, test or production)")]
  UnknownEnvironment(String),

  #[error("failed to read {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse {}: {message}", path.display())]
  Parse { path: PathBuf, message: String },

  #[error("{}: missing required field '{field}'", path.display())]
  MissingField { path: PathBuf, field: &'static str },

  #[error("invalid rootURL '{0}': must start and end with '/'")]
  InvalidRootUrl(String),

  #[error("'{0}' is reserved and cannot be set in the application config")]
  ReservedKey(String),

  #[error("source root not found: {}", .0.display())]
  MissingSourceRoot(PathBuf),

  #[error("invalid output path for {category}: '{path}' ({reason})")]
  InvalidOutputPath {
    category: &'static str,
    path: String,
    reason: String,
  },

  #[error("invalid application name '{0}'")]
  InvalidAppName(String),
}
