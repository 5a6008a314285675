//! CLI output formatting utilities.
//!
//! Status lines, build statistics, stage timings and registry listings share
//! one look across commands.

use anyhow::Context;
use arbor_lib::pipeline::StageReport;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
}

pub fn truncate_hash(hash: &str) -> &str {
  let len = hash.len().min(12);
  &hash[..len]
}

pub fn format_bytes(bytes: u64) -> String {
  const KB: u64 = 1024;
  const MB: u64 = KB * 1024;
  const GB: u64 = MB * 1024;

  if bytes >= GB {
    format!("{:.1} GB", bytes as f64 / GB as f64)
  } else if bytes >= MB {
    format!("{:.1} MB", bytes as f64 / MB as f64)
  } else if bytes >= KB {
    format!("{:.1} KB", bytes as f64 / KB as f64)
  } else {
    format!("{} B", bytes)
  }
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

/// One line per stage: name, output file count and wall time.
pub fn format_stage(stage: &StageReport) -> String {
  let files = if stage.files == 1 { "file" } else { "files" };
  format!(
    "{:<16} {} {} ({})",
    stage.name.as_str(),
    stage.files,
    files,
    humantime::format_duration(stage.duration)
  )
}

pub fn print_section(title: &str) {
  println!();
  println!("{}", title.if_supports_color(Stream::Stdout, |s| s.bold()));
}

pub fn print_item(item: &str) {
  println!(
    "  {} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    item
  );
}

/// `identifier → specifier`, as listed by `arbor registry`.
pub fn print_mapping(from: &str, to: &str) {
  println!(
    "  {} {} {}",
    from,
    symbols::ARROW.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    to.if_supports_color(Stream::Stdout, |s| s.cyan())
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use arbor_lib::StageName;

  use super::*;

  #[test]
  fn test_truncate_hash() {
    assert_eq!(truncate_hash("abcdef123456789"), "abcdef123456");
    assert_eq!(truncate_hash("short"), "short");
    assert_eq!(truncate_hash(""), "");
  }

  #[test]
  fn test_format_stage() {
    let stage = StageReport {
      name: StageName::TemplateCompile,
      files: 1,
      duration: Duration::from_millis(12),
    };
    assert_eq!(format_stage(&stage), "template-compile 1 file (12ms)");

    let stage = StageReport {
      name: StageName::Html,
      files: 3,
      duration: Duration::from_secs(2),
    };
    assert_eq!(format_stage(&stage), "html             3 files (2s)");
  }

  #[test]
  fn test_format_bytes() {
    assert_eq!(format_bytes(500), "500 B");
    assert_eq!(format_bytes(1024), "1.0 KB");
    assert_eq!(format_bytes(1536), "1.5 KB");
    assert_eq!(format_bytes(1048576), "1.0 MB");
  }
}
