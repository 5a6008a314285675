//! Addons written in Lua.
//!
//! An addon file returns a table:
//!
//! ```lua
//! return {
//!   name = "brand",
//!   preprocessTree = function(type, tree) ... end,
//!   postprocessTree = function(type, tree) ... end,
//!   lintTree = function(type, tree) ... end,
//!   treeFor = function(type) return __dir .. "/public" end,
//! }
//! ```
//!
//! Every hook is optional. Tree hooks receive and return `path -> contents`
//! tables; returning `nil` leaves the tree unchanged. `treeFor` may return a
//! directory path (relative paths resolve against the addon's directory), a
//! tree table, or `nil`.

use std::path::{Path, PathBuf};

use mlua::prelude::*;
use tracing::debug;

use super::convert::{optional_tree, table_to_tree, tree_to_table};
use super::loaders::load_file_with_dir;
use crate::addon::{Addon, AddonError, HookError, HookKind, TreeContribution, TreeType};
use crate::tree::FileTree;

const TREE_HOOKS: [HookKind; 3] = [HookKind::PreprocessTree, HookKind::PostprocessTree, HookKind::LintTree];

/// Load and validate an addon file.
///
/// # Errors
///
/// `Load` if the file fails to run, `InvalidShape` if it does not return a
/// table with a non-empty `name` and function-or-nil hooks.
pub fn load_addon(lua: &Lua, path: &Path) -> Result<Addon, AddonError> {
  let value = load_file_with_dir(lua, path).map_err(|e| AddonError::Load {
    path: path.to_path_buf(),
    message: e.to_string(),
  })?;

  let invalid = |message: String| AddonError::InvalidShape {
    path: path.to_path_buf(),
    message,
  };

  let LuaValue::Table(table) = value else {
    return Err(invalid(format!("expected the file to return a table, got {}", value.type_name())));
  };

  let name = match table.get::<LuaValue>("name").map_err(|e| invalid(e.to_string()))? {
    LuaValue::String(s) => s.to_str().map_err(|e| invalid(e.to_string()))?.to_string(),
    other => return Err(invalid(format!("'name' must be a string, got {}", other.type_name()))),
  };
  if name.trim().is_empty() {
    return Err(invalid("'name' must not be empty".to_string()));
  }

  let root: PathBuf = dunce::canonicalize(path)
    .ok()
    .and_then(|p| p.parent().map(Path::to_path_buf))
    .unwrap_or_else(|| path.parent().map(Path::to_path_buf).unwrap_or_default());

  let mut addon = Addon::new(name, root)?;

  for kind in TREE_HOOKS {
    if let Some(func) = hook_function(&table, kind).map_err(invalid)? {
      addon = attach_tree_hook(addon, kind, LuaHook { lua: lua.clone(), func });
    }
  }

  if let Some(func) = hook_function(&table, HookKind::TreeFor).map_err(invalid)? {
    let hook = LuaHook { lua: lua.clone(), func };
    addon = addon.with_tree_for(move |tree_type| hook.call_tree_for(tree_type));
  }

  debug!(addon = %addon.name(), path = %path.display(), hooks = ?addon.hooks(), "loaded addon");
  Ok(addon)
}

fn hook_function(table: &LuaTable, kind: HookKind) -> Result<Option<LuaFunction>, String> {
  match table.get::<LuaValue>(kind.as_str()).map_err(|e| e.to_string())? {
    LuaValue::Nil => Ok(None),
    LuaValue::Function(f) => Ok(Some(f)),
    other => Err(format!("'{}' must be a function, got {}", kind, other.type_name())),
  }
}

fn attach_tree_hook(addon: Addon, kind: HookKind, hook: LuaHook) -> Addon {
  let call = move |tree_type: TreeType, tree: &FileTree| hook.call_tree(tree_type, tree);
  match kind {
    HookKind::PreprocessTree => addon.with_preprocess_tree(call),
    HookKind::PostprocessTree => addon.with_postprocess_tree(call),
    HookKind::LintTree => addon.with_lint_tree(call),
    HookKind::TreeFor => addon,
  }
}

/// A hook function together with the state it lives in. Functions only hold
/// a weak reference to their state, so the hook keeps it alive.
struct LuaHook {
  lua: Lua,
  func: LuaFunction,
}

impl LuaHook {
  fn call_tree(&self, tree_type: TreeType, tree: &FileTree) -> Result<Option<FileTree>, HookError> {
    let table = tree_to_table(&self.lua, tree).map_err(|e| HookError::Failed(e.to_string()))?;
    let result: LuaValue = self
      .func
      .call((tree_type.as_str(), table))
      .map_err(|e| HookError::Failed(e.to_string()))?;
    optional_tree(result)
  }

  fn call_tree_for(&self, tree_type: TreeType) -> Result<Option<TreeContribution>, HookError> {
    let result: LuaValue = self
      .func
      .call(tree_type.as_str())
      .map_err(|e| HookError::Failed(e.to_string()))?;

    match result {
      LuaValue::Nil => Ok(None),
      LuaValue::String(s) => {
        let path = s.to_str().map_err(|e| HookError::Failed(e.to_string()))?.to_string();
        Ok(Some(TreeContribution::Path(PathBuf::from(path))))
      }
      LuaValue::Table(table) => Ok(Some(TreeContribution::Tree(table_to_tree(&table)?))),
      other => Err(HookError::InvalidReturn {
        expected: "a directory path, a tree table or nil",
        found: other.type_name().to_string(),
      }),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::addon::AddonRegistry;
  use std::fs;
  use tempfile::TempDir;

  fn write_addon(dir: &TempDir, file: &str, source: &str) -> PathBuf {
    let path = dir.path().join(file);
    fs::write(&path, source).unwrap();
    path
  }

  #[test]
  fn loads_hooks_that_are_present() {
    let dir = TempDir::new().unwrap();
    let path = write_addon(
      &dir,
      "stamp.lua",
      r#"
        return {
          name = "stamp",
          postprocessTree = function(type, tree)
            tree["stamp.txt"] = type
            return tree
          end,
        }
      "#,
    );

    let lua = Lua::new();
    let addon = load_addon(&lua, &path).unwrap();
    assert_eq!(addon.name(), "stamp");
    assert_eq!(addon.hooks(), vec![HookKind::PostprocessTree]);

    let registry = AddonRegistry::new(vec![addon]).unwrap();
    let out = registry.postprocess_tree(TreeType::Html, FileTree::new()).unwrap();
    assert_eq!(out.get_str("stamp.txt"), Some("html"));
  }

  #[test]
  fn tree_for_path_resolves_against_addon_directory() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("public")).unwrap();
    fs::write(dir.path().join("public/logo.svg"), "<svg/>").unwrap();
    let path = write_addon(
      &dir,
      "brand.lua",
      r#"return { name = "brand", treeFor = function(type) if type == "public" then return "public" end end }"#,
    );

    let lua = Lua::new();
    let registry = AddonRegistry::new(vec![load_addon(&lua, &path).unwrap()]).unwrap();
    let contributions = registry.tree_for(TreeType::Public).unwrap();

    assert_eq!(contributions.len(), 1);
    assert_eq!(contributions[0].1.get_str("logo.svg"), Some("<svg/>"));
  }

  #[test]
  fn hook_errors_carry_lua_message() {
    let dir = TempDir::new().unwrap();
    let path = write_addon(
      &dir,
      "broken.lua",
      r#"return { name = "broken", preprocessTree = function() error("template cache missing") end }"#,
    );

    let lua = Lua::new();
    let registry = AddonRegistry::new(vec![load_addon(&lua, &path).unwrap()]).unwrap();
    let err = registry.preprocess_tree(TreeType::Template, FileTree::new()).unwrap_err();
    let message = err.to_string();

    assert!(message.starts_with("addon 'broken' preprocessTree(\"template\") failed:"), "got: {}", message);
    assert!(message.contains("template cache missing"));
  }

  #[test]
  fn invalid_shapes_are_rejected() {
    let dir = TempDir::new().unwrap();
    let lua = Lua::new();
    let cases = [
      ("not-table.lua", "return 42", "expected the file to return a table"),
      ("no-name.lua", "return {}", "'name' must be a string"),
      ("empty-name.lua", r#"return { name = "" }"#, "'name' must not be empty"),
      (
        "bad-hook.lua",
        r#"return { name = "x", lintTree = "nope" }"#,
        "'lintTree' must be a function",
      ),
    ];

    for (file, source, expected) in cases {
      let path = write_addon(&dir, file, source);
      let err = load_addon(&lua, &path).unwrap_err();
      assert!(matches!(err, AddonError::InvalidShape { .. }), "{}: {:?}", file, err);
      assert!(err.to_string().contains(expected), "{}: {}", file, err);
    }
  }

  #[test]
  fn syntax_errors_are_load_errors() {
    let dir = TempDir::new().unwrap();
    let path = write_addon(&dir, "syntax.lua", "return {");
    let err = load_addon(&Lua::new(), &path).unwrap_err();
    assert!(matches!(err, AddonError::Load { .. }));
  }
}
