//! Compiler collaborators used by the pipeline stages.
//!
//! Each collaborator is a trait so builds can swap in real toolchains. The
//! defaults shipped here are intentionally small but complete enough to
//! produce a runnable bundle:
//!
//! | Trait | Default |
//! |---|---|
//! | [`TemplateCompiler`] | [`ModuleTemplateCompiler`] |
//! | [`ScriptTranspiler`] | [`PassthroughTranspiler`] |
//! | [`Bundler`] | [`AmdBundler`] |
//! | [`StyleCompiler`] | [`ConcatStyleCompiler`] |

mod bundle;
pub mod macros;
mod script;
mod style;
pub mod syntax;
mod template;
mod types;

pub use bundle::*;
pub use script::*;
pub use style::*;
pub use template::*;
pub use types::*;
