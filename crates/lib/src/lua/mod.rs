//! Lua host for project extensions.
//!
//! Projects declare addons and source plugins as Lua files in `arbor.json`.
//! This module runs those files and turns what they return into [`Addon`]
//! records and [`SourcePlugin`]s.
//!
//! # Submodules
//!
//! - [`addon`] - addon files and their hooks
//! - [`convert`] - tree <-> table conversion
//! - [`loaders`] - `__dir`-aware file loading
//! - [`plugin`] - source plugin files
//! - [`runtime`] - the shared Lua state
//!
//! [`Addon`]: crate::addon::Addon
//! [`SourcePlugin`]: crate::compile::SourcePlugin

pub mod addon;
pub mod convert;
pub mod loaders;
pub mod plugin;
pub mod runtime;
