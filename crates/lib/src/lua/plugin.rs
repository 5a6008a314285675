//! Source plugins written in Lua.
//!
//! A plugin file returns either a function or a table with a `transform`
//! function and an optional `name`:
//!
//! ```lua
//! return function(path, code)
//!   return (code:gsub("console%.log%b();?", ""))
//! end
//! ```
//!
//! Returning `nil` leaves the code unchanged.

use std::path::Path;
use std::rc::Rc;

use mlua::prelude::*;
use thiserror::Error;

use super::loaders::load_file_with_dir;
use crate::compile::{SourcePlugin, TransformError};

#[derive(Debug, Error)]
pub enum PluginError {
  #[error("failed to load plugin {}: {message}", path.display())]
  Load { path: std::path::PathBuf, message: String },

  #[error("invalid plugin {}: {message}", path.display())]
  InvalidShape { path: std::path::PathBuf, message: String },
}

/// A plugin backed by a Lua function.
pub struct LuaPlugin {
  name: String,
  lua: Lua,
  transform: LuaFunction,
}

impl std::fmt::Debug for LuaPlugin {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("LuaPlugin").field("name", &self.name).finish_non_exhaustive()
  }
}

impl SourcePlugin for LuaPlugin {
  fn name(&self) -> &str {
    &self.name
  }

  fn transform(&self, path: &str, code: &str) -> Result<Option<String>, TransformError> {
    let failed = |message: String| TransformError::Plugin {
      path: path.to_string(),
      plugin: self.name.clone(),
      message,
    };

    let code = self.lua.create_string(code).map_err(|e| failed(e.to_string()))?;
    let result: LuaValue = self.transform.call((path, code)).map_err(|e| failed(e.to_string()))?;

    match result {
      LuaValue::Nil => Ok(None),
      LuaValue::String(s) => Ok(Some(s.to_str().map_err(|e| failed(e.to_string()))?.to_string())),
      other => Err(failed(format!("expected a string or nil, got {}", other.type_name()))),
    }
  }
}

/// Load a plugin file.
pub fn load_plugin(lua: &Lua, path: &Path) -> Result<Rc<dyn SourcePlugin>, PluginError> {
  let value = load_file_with_dir(lua, path).map_err(|e| PluginError::Load {
    path: path.to_path_buf(),
    message: e.to_string(),
  })?;

  let invalid = |message: String| PluginError::InvalidShape {
    path: path.to_path_buf(),
    message,
  };

  let default_name = path
    .file_stem()
    .map(|s| s.to_string_lossy().into_owned())
    .unwrap_or_else(|| "plugin".to_string());

  let (name, transform) = match value {
    LuaValue::Function(f) => (default_name, f),
    LuaValue::Table(table) => {
      let name = match table.get::<LuaValue>("name").map_err(|e| invalid(e.to_string()))? {
        LuaValue::Nil => default_name,
        LuaValue::String(s) => s.to_str().map_err(|e| invalid(e.to_string()))?.to_string(),
        other => return Err(invalid(format!("'name' must be a string, got {}", other.type_name()))),
      };
      match table.get::<LuaValue>("transform").map_err(|e| invalid(e.to_string()))? {
        LuaValue::Function(f) => (name, f),
        other => {
          return Err(invalid(format!("'transform' must be a function, got {}", other.type_name())));
        }
      }
    }
    other => {
      return Err(invalid(format!(
        "expected the file to return a function or a table, got {}",
        other.type_name()
      )));
    }
  };

  tracing::debug!(plugin = %name, path = %path.display(), "loaded plugin");
  Ok(Rc::new(LuaPlugin {
    name,
    lua: lua.clone(),
    transform,
  }))
}
