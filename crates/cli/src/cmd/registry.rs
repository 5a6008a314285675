//! Implementation of the `arbor registry` command.

use std::path::Path;

use anyhow::{Context, Result};

use arbor_lib::{Builder, LintPolicy};

use super::resolve_environment;
use crate::output::{OutputFormat, print_info, print_json, print_mapping, print_success};

pub fn cmd_registry(project: &Path, environment: Option<&str>, format: OutputFormat) -> Result<()> {
  let environment = resolve_environment(environment)?;

  let builder = Builder::from_project(project, environment, LintPolicy::Disabled)
    .with_context(|| format!("Failed to load project: {}", project.display()))?;
  let registry = builder.registry().context("Failed to derive module registry")?;

  if format.is_json() {
    let entries: Vec<_> = registry
      .entries()
      .map(|e| serde_json::json!({ "identifier": e.identifier, "specifier": e.specifier }))
      .collect();
    let json_output = serde_json::json!({
      "app": builder.project().name(),
      "modules": entries,
      "resolver": builder.resolver_config(),
    });
    print_json(&json_output)?;
    return Ok(());
  }

  if registry.is_empty() {
    print_info("No modules registered");
    return Ok(());
  }

  print_success(&format!("{} module(s) registered", registry.len()));
  for entry in registry.entries() {
    print_mapping(&entry.identifier, &entry.specifier);
  }

  Ok(())
}
