//! Module registry derivation.
//!
//! The runtime resolver looks modules up by string identifiers of the form
//! `<type>:/<rootName>/<name>`. This module scans compiled script output,
//! classifies each file against the [`ResolverConfiguration`] and generates
//! the modules that expose the result to application code:
//!
//! - `config/module-map.js`: identifier → module
//! - `config/resolver-configuration.js`: the configuration itself
//!
//! # Example
//!
//! ```
//! use arbor_lib::registry::{ModuleRegistry, ResolverConfiguration};
//! use arbor_lib::tree::FileTree;
//!
//! let tree = FileTree::from_files([
//!     ("ui/components/foo-bar/component.js", "export default class {}"),
//!     ("ui/components/foo-bar/template.js", "export default {}"),
//! ]).unwrap();
//! let config = ResolverConfiguration::new("app-name");
//! let registry = ModuleRegistry::build(&tree, &config).unwrap();
//!
//! assert_eq!(registry.get("component:/app-name/foo-bar"), Some("ui/components/foo-bar/component"));
//! assert_eq!(registry.get("template:/app-name/foo-bar"), Some("ui/components/foo-bar/template"));
//! ```

mod codegen;
mod resolver;
mod types;

pub use codegen::*;
pub use resolver::*;
pub use types::*;
