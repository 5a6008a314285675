mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{BuildArgs, cmd_build, cmd_registry};
use output::OutputFormat;

/// arbor - application bundle builder
#[derive(Parser)]
#[command(name = "arbor")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build the application bundle
  Build {
    /// Project directory (default: current directory)
    #[arg(default_value = ".")]
    project: PathBuf,

    /// Environment: development, test or production (default: $ARBOR_ENV, then development)
    #[arg(short, long)]
    environment: Option<String>,

    /// Output directory (default: <project>/dist)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Run addon lint hooks
    #[arg(long)]
    lint: bool,

    /// Write lint results to this directory
    #[arg(long)]
    lint_output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// Print the module registry
  Registry {
    /// Project directory (default: current directory)
    #[arg(default_value = ".")]
    project: PathBuf,

    /// Environment: development, test or production
    #[arg(short, long)]
    environment: Option<String>,

    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cli.command {
    Commands::Build {
      project,
      environment,
      output,
      lint,
      lint_output,
      format,
    } => cmd_build(&BuildArgs {
      project,
      environment,
      output,
      lint,
      lint_output,
      format,
      verbose: cli.verbose,
    }),
    Commands::Registry {
      project,
      environment,
      format,
    } => cmd_registry(&project, environment.as_deref(), format),
  }
}
