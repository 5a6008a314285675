//! Immutable file trees.
//!
//! A [`FileTree`] is the unit of data flowing between pipeline stages: a set of
//! relative `/`-separated paths mapped to byte contents. Trees are never
//! mutated in place. Every operation returns a new tree, and clones share
//! their storage, so a stage can hand its output to several consumers cheaply.
//!
//! Paths are normalized on the way in (`\` becomes `/`, `.` segments and
//! duplicate separators are dropped); absolute paths and `..` segments are
//! rejected.

mod fs;
mod types;

pub use types::*;
