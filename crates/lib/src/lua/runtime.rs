use std::path::{Path, PathBuf};
use std::rc::Rc;

use mlua::prelude::*;
use tracing::info;

use super::addon::load_addon;
use super::loaders::install_loaders;
use super::plugin::{PluginError, load_plugin};
use crate::addon::{Addon, AddonError};
use crate::compile::SourcePlugin;

const LUA_DIR: &str = "lua";

/// Create a Lua state for project extensions.
///
/// `require` searches `<project>/lua/` before `package.path`, and every
/// loaded file sees its own directory as `__dir`.
pub fn create_runtime(project_root: &Path) -> LuaResult<Lua> {
  let lua = Lua::new();
  install_loaders(&lua, &project_root.join(LUA_DIR))?;
  Ok(lua)
}

/// One Lua state shared by all of a project's extensions.
pub struct LuaHost {
  lua: Lua,
  project_root: PathBuf,
}

impl LuaHost {
  pub fn new(project_root: &Path) -> LuaResult<Self> {
    Ok(Self {
      lua: create_runtime(project_root)?,
      project_root: project_root.to_path_buf(),
    })
  }

  fn resolve(&self, path: &Path) -> PathBuf {
    if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.project_root.join(path)
    }
  }

  /// Load addons in declaration order. Paths are relative to the project root.
  pub fn load_addons(&self, paths: &[PathBuf]) -> Result<Vec<Addon>, AddonError> {
    let addons = paths
      .iter()
      .map(|path| load_addon(&self.lua, &self.resolve(path)))
      .collect::<Result<Vec<_>, _>>()?;
    if !addons.is_empty() {
      info!(count = addons.len(), "loaded addons");
    }
    Ok(addons)
  }

  /// Load source plugins in declaration order.
  pub fn load_plugins(&self, paths: &[PathBuf]) -> Result<Vec<Rc<dyn SourcePlugin>>, PluginError> {
    paths
      .iter()
      .map(|path| load_plugin(&self.lua, &self.resolve(path)))
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::TempDir;

  #[test]
  fn addons_can_require_project_lua_modules() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("lua")).unwrap();
    fs::create_dir_all(temp.path().join("addons")).unwrap();
    fs::write(temp.path().join("lua/naming.lua"), r#"return { prefix = "acme-" }"#).unwrap();
    fs::write(
      temp.path().join("addons/brand.lua"),
      r#"local naming = require("naming"); return { name = naming.prefix .. "brand" }"#,
    )
    .unwrap();

    let host = LuaHost::new(temp.path()).unwrap();
    let addons = host.load_addons(&[PathBuf::from("addons/brand.lua")]).unwrap();

    assert_eq!(addons.len(), 1);
    assert_eq!(addons[0].name(), "acme-brand");
  }

  #[test]
  fn plugins_load_in_order() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.lua"), "return function(p, c) return c .. 'a' end").unwrap();
    fs::write(temp.path().join("b.lua"), "return function(p, c) return c .. 'b' end").unwrap();

    let host = LuaHost::new(temp.path()).unwrap();
    let plugins = host
      .load_plugins(&[PathBuf::from("a.lua"), PathBuf::from("b.lua")])
      .unwrap();

    let names: Vec<&str> = plugins.iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["a", "b"]);
  }

  #[test]
  fn missing_addon_file_is_load_error() {
    let temp = TempDir::new().unwrap();
    let host = LuaHost::new(temp.path()).unwrap();
    let err = host.load_addons(&[PathBuf::from("nope.lua")]).unwrap_err();
    assert!(matches!(err, AddonError::Load { .. }));
  }
}
