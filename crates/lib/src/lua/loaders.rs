//! Loading extension files.
//!
//! Every file runs with `__dir` bound to its own directory. Project modules
//! under `<project>/lua/` are found by `require` through an extra searcher
//! that loads them the same way, so shared helpers see their own `__dir` too.

use std::fs;
use std::path::{Path, PathBuf};

use mlua::prelude::*;

/// Run the Lua file at `path` and return its value.
///
/// Globals stay reachable for reads and writes; `__dir` is local to the file.
pub fn load_file_with_dir(lua: &Lua, path: &Path) -> LuaResult<LuaValue> {
  let path = dunce::canonicalize(path).map_err(|e| LuaError::external(format!("{}: {}", path.display(), e)))?;
  let source = fs::read(&path).map_err(|e| LuaError::external(format!("{}: {}", path.display(), e)))?;
  let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

  lua
    .load(source.as_slice())
    .set_name(format!("@{}", path.display()))
    .set_environment(file_env(lua, &dir)?)
    .eval()
}

fn file_env(lua: &Lua, dir: &Path) -> LuaResult<LuaTable> {
  let env = lua.create_table()?;
  env.set("__dir", dir.to_string_lossy().into_owned())?;

  let meta = lua.create_table()?;
  meta.set("__index", lua.globals())?;
  meta.set("__newindex", lua.globals())?;
  env.set_metatable(Some(meta))?;
  Ok(env)
}

/// `a.b` → `<root>/a/b.lua`, else `<root>/a/b/init.lua`.
fn module_file(root: &Path, name: &str) -> Option<PathBuf> {
  let relative: PathBuf = name.split('.').collect();
  [relative.with_extension("lua"), relative.join("init.lua")]
    .into_iter()
    .map(|candidate| root.join(candidate))
    .find(|candidate| candidate.is_file())
}

/// Make `require` look in `root` before `package.path`.
pub fn install_loaders(lua: &Lua, root: &Path) -> LuaResult<()> {
  let root = root.to_path_buf();
  let searcher = lua.create_function(move |lua, name: String| match module_file(&root, &name) {
    Some(file) => {
      let origin = lua.create_string(file.to_string_lossy().as_bytes())?;
      let loader = lua.create_function(move |lua, _: LuaMultiValue| load_file_with_dir(lua, &file))?;
      Ok((LuaValue::Function(loader), LuaValue::String(origin)))
    }
    None => {
      let reason = format!("\n\tno module '{}' in '{}'", name, root.display());
      Ok((LuaValue::String(lua.create_string(&reason)?), LuaValue::Nil))
    }
  })?;

  let package: LuaTable = lua.globals().get("package")?;
  let searchers: LuaTable = package.get("searchers")?;
  let table: LuaTable = lua.globals().get("table")?;
  let insert: LuaFunction = table.get("insert")?;
  insert.call::<()>((searchers, 2, searcher))
}
