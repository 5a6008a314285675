//! Addons and hook dispatch.
//!
//! An addon contributes up to four optional hooks:
//!
//! | Hook | Called with | Returns |
//! |---|---|---|
//! | `preprocessTree` | `template`, `js`, `css` | replacement tree or nothing |
//! | `postprocessTree` | `template`, `js`, `css`, `html`, `all` | replacement tree or nothing |
//! | `lintTree` | `src`, `templates` | lint results or nothing |
//! | `treeFor` | `public` | a directory, a tree, or nothing |
//!
//! Addons are validated once, when the [`Addon`] record is built, and hooks
//! are dispatched by [`AddonRegistry`] strictly in declaration order.

mod dispatch;
mod types;

pub use dispatch::*;
pub use types::*;
