//! Crossing the Lua boundary with file trees.
//!
//! A tree is a plain table of `path -> contents`. Contents are Lua strings,
//! which are byte strings, so binary files survive the round trip.

use mlua::prelude::*;

use crate::addon::HookError;
use crate::tree::{FileTree, TreeBuilder};

/// Build a `path -> contents` table.
pub fn tree_to_table(lua: &Lua, tree: &FileTree) -> LuaResult<LuaTable> {
  let table = lua.create_table_with_capacity(0, tree.len())?;
  for (path, contents) in tree.iter() {
    table.set(path, lua.create_string(contents)?)?;
  }
  Ok(table)
}

/// Read a `path -> contents` table back into a tree.
pub fn table_to_tree(table: &LuaTable) -> Result<FileTree, HookError> {
  let mut builder = TreeBuilder::new();

  for pair in table.pairs::<LuaValue, LuaValue>() {
    let (key, value) = pair.map_err(|e| HookError::Failed(e.to_string()))?;

    let LuaValue::String(path) = key else {
      return Err(HookError::InvalidReturn {
        expected: "string paths",
        found: key.type_name().to_string(),
      });
    };
    let LuaValue::String(contents) = value else {
      return Err(HookError::InvalidReturn {
        expected: "string contents",
        found: value.type_name().to_string(),
      });
    };

    let path = path.to_str().map_err(|e| HookError::Failed(e.to_string()))?.to_string();
    builder
      .add(&path, contents.as_bytes().to_vec())
      .map_err(|e| HookError::Failed(e.to_string()))?;
  }

  Ok(builder.build())
}

/// Interpret a hook's return value: `nil` or a tree table.
pub fn optional_tree(value: LuaValue) -> Result<Option<FileTree>, HookError> {
  match value {
    LuaValue::Nil => Ok(None),
    LuaValue::Table(table) => table_to_tree(&table).map(Some),
    other => Err(HookError::InvalidReturn {
      expected: "a table of path -> contents or nil",
      found: other.type_name().to_string(),
    }),
  }
}
