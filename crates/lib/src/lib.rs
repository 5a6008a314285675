//! arbor-lib: build graph and module registry engine for Arbor
//!
//! This crate turns an application source tree into a deployable bundle:
//! - `tree`: immutable file trees flowing between stages
//! - `pipeline`: the ordered stage graph and the [`Builder`] that runs it
//! - `addon`: third-party hooks injected around stages
//! - `registry`: identifier → module mapping consumed by the runtime resolver
//! - `assemble`: merging stage outputs into the final layout
//! - `config`: environment, application and build configuration

pub mod addon;
pub mod assemble;
pub mod compile;
pub mod config;
pub mod consts;
pub mod lua;
pub mod options;
pub mod pipeline;
pub mod placeholder;
pub mod project;
pub mod registry;
pub mod tree;
pub mod util;

pub use addon::{Addon, AddonError, AddonRegistry, HookError, TreeContribution, TreeType};
pub use config::{AppConfig, ConfigError, Environment};
pub use options::{BuildOptions, LintPolicy, OutputPaths, TreeSource, TreeSources};
pub use pipeline::{BuildError, BuildOutput, Builder, StageName};
pub use project::Project;
pub use registry::{ModuleRegistry, ResolverConfiguration};
pub use tree::FileTree;
