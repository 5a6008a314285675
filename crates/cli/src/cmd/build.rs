//! Implementation of the `arbor build` command.
//!
//! Builds the project's application bundle and writes it to the output
//! directory. The write is atomic and skipped when the directory already holds
//! the same content.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::info;

use arbor_lib::util::hash::hash_directory;
use arbor_lib::{BuildOutput, Builder, Environment, LintPolicy};

use super::resolve_environment;
use crate::output::{
  OutputFormat, format_bytes, format_stage, print_info, print_item, print_json, print_section, print_stat, print_success,
  print_warning, symbols, truncate_hash,
};

const DEFAULT_OUTPUT_DIR: &str = "dist";

pub struct BuildArgs {
  pub project: PathBuf,
  pub environment: Option<String>,
  pub output: Option<PathBuf>,
  pub lint: bool,
  pub lint_output: Option<PathBuf>,
  pub format: OutputFormat,
  pub verbose: bool,
}

/// Lint runs when asked for, or always in the test environment.
fn lint_policy(args: &BuildArgs, environment: Environment) -> LintPolicy {
  if args.lint || args.lint_output.is_some() || environment == Environment::Test {
    LintPolicy::Enabled
  } else {
    LintPolicy::Disabled
  }
}

/// Whether `dest` already holds exactly `output`.
fn is_unchanged(dest: &Path, output: &BuildOutput) -> bool {
  dest.is_dir()
    && hash_directory(dest, &[])
      .map(|existing| existing == output.tree.content_hash())
      .unwrap_or(false)
}

/// `path` as an absolute path with symlinks resolved, even if it does not
/// exist yet.
fn resolve_path(path: &Path) -> Result<PathBuf> {
  let absolute = std::path::absolute(path).with_context(|| format!("Invalid path: {}", path.display()))?;

  let mut lexical = PathBuf::new();
  for component in absolute.components() {
    match component {
      Component::ParentDir => {
        lexical.pop();
      }
      Component::CurDir => {}
      other => lexical.push(other),
    }
  }

  let mut existing = lexical.as_path();
  let mut missing = Vec::new();
  while !existing.exists()
    && let (Some(parent), Some(name)) = (existing.parent(), existing.file_name())
  {
    missing.push(name.to_os_string());
    existing = parent;
  }

  let mut resolved = dunce::canonicalize(existing).unwrap_or_else(|_| existing.to_path_buf());
  resolved.extend(missing.iter().rev());
  Ok(resolved)
}

/// Writing replaces `dest` wholesale, so it must not hold the project or its
/// sources.
fn check_output_dir(dest: &Path, project_root: &Path, source_dir: Option<&Path>) -> Result<()> {
  let dest = resolve_path(dest)?;
  let root = resolve_path(project_root)?;
  if root.starts_with(&dest) {
    bail!(
      "Output directory {} would replace the project at {}",
      dest.display(),
      root.display()
    );
  }

  if let Some(source_dir) = source_dir {
    let src = resolve_path(source_dir)?;
    if src.starts_with(&dest) || dest.starts_with(&src) {
      bail!(
        "Output directory {} overlaps the source directory {}",
        dest.display(),
        src.display()
      );
    }
  }
  Ok(())
}

pub fn cmd_build(args: &BuildArgs) -> Result<()> {
  let environment = resolve_environment(args.environment.as_deref())?;
  let lint = lint_policy(args, environment);

  let builder = Builder::from_project(&args.project, environment, lint)
    .with_context(|| format!("Failed to load project: {}", args.project.display()))?;

  let dest = args
    .output
    .clone()
    .unwrap_or_else(|| builder.project().root().join(DEFAULT_OUTPUT_DIR));
  check_output_dir(&dest, builder.project().root(), builder.source_dir())?;

  let output = builder.build().context("Build failed")?;

  let written = if is_unchanged(&dest, &output) {
    info!(dest = %dest.display(), "output unchanged, skipping write");
    false
  } else {
    output
      .tree
      .write_to(&dest)
      .with_context(|| format!("Failed to write output: {}", dest.display()))?;
    true
  };

  if let Some(lint_dir) = &args.lint_output {
    output
      .lint
      .write_to(lint_dir)
      .with_context(|| format!("Failed to write lint results: {}", lint_dir.display()))?;
  }

  let hash = output.tree.content_hash();
  let bytes: u64 = output.tree.iter().map(|(_, contents)| contents.len() as u64).sum();
  let elapsed: Duration = output.stages.iter().map(|s| s.duration).sum();

  if args.format.is_json() {
    let stages: Vec<_> = output
      .stages
      .iter()
      .map(|s| serde_json::json!({ "name": s.name.as_str(), "files": s.files, "duration_ms": s.duration.as_millis() as u64 }))
      .collect();
    let json_output = serde_json::json!({
      "app": builder.project().name(),
      "environment": environment.as_str(),
      "output": dest.display().to_string(),
      "hash": hash.0,
      "written": written,
      "files": output.tree.paths().collect::<Vec<_>>(),
      "lint": output.lint.paths().collect::<Vec<_>>(),
      "modules": output.registry.len(),
      "stages": stages,
    });
    print_json(&json_output)?;
    return Ok(());
  }

  print_success(&format!(
    "Built {} ({}) {} {}",
    builder.project().name(),
    environment,
    symbols::ARROW,
    dest.display()
  ));
  print_stat("Files", &output.tree.len().to_string());
  print_stat("Size", &format_bytes(bytes));
  print_stat("Modules", &output.registry.len().to_string());
  print_stat("Hash", truncate_hash(&hash.0));
  print_stat("Time", &humantime::format_duration(elapsed).to_string());

  if args.verbose {
    print_section("Stages:");
    for stage in &output.stages {
      print_item(&format_stage(stage));
    }
    print_section("Files:");
    for path in output.tree.paths() {
      print_item(path);
    }
  }

  if !written {
    print_info("Output unchanged, nothing written");
  }
  if !output.lint.is_empty() {
    print_warning(&format!("Lint produced {} result file(s)", output.lint.len()));
  }

  Ok(())
}
