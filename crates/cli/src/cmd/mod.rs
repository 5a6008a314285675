mod build;
mod registry;

pub use build::{BuildArgs, cmd_build};
pub use registry::cmd_registry;

use anyhow::{Context, Result};
use arbor_lib::Environment;
use arbor_lib::config::env_override;

/// Resolve the environment once: flag, then `ARBOR_ENV`, then the default.
fn resolve_environment(explicit: Option<&str>) -> Result<Environment> {
  Environment::resolve(explicit, env_override().as_deref()).context("Failed to resolve environment")
}
