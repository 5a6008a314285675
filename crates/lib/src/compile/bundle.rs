use std::collections::{BTreeSet, VecDeque};

use serde::Deserialize;
use tracing::{debug, trace};

use super::syntax::module_sources;
use super::{BundleInput, Bundler, TransformError, apply_plugins, source_text};
use crate::consts::DEFAULT_JS_OUTPUT;
use crate::tree::FileTree;

/// Default bundler.
///
/// Emits a single `app.js` containing, in order:
/// 1. every package module reached from application code, as
///    `define("<package id>", function () { ... });`
/// 2. every application module in path order, as
///    `define("<app>/<specifier>", function () { ... });`
/// 3. `require("<app>/index");` (or `main`) when such an entry exists
///
/// The module loader itself is expected to be provided by the page.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmdBundler;

#[derive(Debug, Default, Deserialize)]
struct PackageManifest {
  module: Option<String>,
  main: Option<String>,
}

impl Bundler for AmdBundler {
  fn bundle(&self, input: &BundleInput<'_>) -> Result<FileTree, TransformError> {
    let app_modules: Vec<(&str, &[u8])> = input.modules.iter().filter(|(path, _)| path.ends_with(".js")).collect();
    if app_modules.is_empty() {
      debug!("no application modules, skipping bundle");
      return Ok(FileTree::new());
    }

    let mut app_defines = Vec::with_capacity(app_modules.len());
    let mut pending: VecDeque<(String, String)> = VecDeque::new();

    for (path, bytes) in &app_modules {
      let code = apply_plugins(input.plugins, path, source_text(path, bytes)?.to_string())?;
      for source in module_sources(path, &code)? {
        if is_bare(&source, input.app_name) {
          pending.push_back((path.to_string(), source));
        }
      }
      let id = format!("{}/{}", input.app_name, strip_js(path));
      app_defines.push(define(&id, &code));
    }

    let mut package_defines = Vec::new();
    let mut seen = BTreeSet::new();

    while let Some((importer, id)) = pending.pop_front() {
      if !seen.insert(id.clone()) {
        continue;
      }

      let file = resolve_package(input.node_modules, &id).ok_or_else(|| TransformError::UnresolvedPackage {
        path: importer.clone(),
        package: id.clone(),
      })?;
      trace!(package = %id, file = %file, "resolved package import");

      let bytes = input.node_modules.get(&file).unwrap_or_default();
      let code = apply_plugins(input.plugins, &file, source_text(&file, bytes)?.to_string())?;

      for source in module_sources(&file, &code)? {
        if source.starts_with('.') {
          pending.push_back((file.clone(), relative_id(&file, &source)));
        } else if is_bare(&source, input.app_name) {
          pending.push_back((file.clone(), source));
        }
      }
      package_defines.push(define(&id, &code));
    }

    let mut out = String::new();
    for chunk in package_defines.iter().chain(app_defines.iter()) {
      out.push_str(chunk);
    }

    let entry = ["index.js", "main.js"]
      .into_iter()
      .find(|entry| input.modules.contains(entry));
    if let Some(entry) = entry {
      out.push_str(&format!("require(\"{}/{}\");\n", input.app_name, strip_js(entry)));
    }

    debug!(
      app_modules = app_defines.len(),
      packages = package_defines.len(),
      entry = entry.unwrap_or("none"),
      "bundled modules"
    );

    FileTree::from_files([(DEFAULT_JS_OUTPUT, out)]).map_err(|e| TransformError::failed(DEFAULT_JS_OUTPUT, e))
  }
}

fn define(id: &str, code: &str) -> String {
  let mut body = code.to_string();
  if !body.ends_with('\n') {
    body.push('\n');
  }
  format!("define(\"{}\", function () {{\n{}}});\n", id, body)
}

fn strip_js(path: &str) -> &str {
  path.strip_suffix(".js").unwrap_or(path)
}

/// A package import: neither relative, absolute, nor one of the app's own modules.
fn is_bare(source: &str, app_name: &str) -> bool {
  !(source.starts_with('.')
    || source.starts_with('/')
    || source == app_name
    || source.starts_with(&format!("{}/", app_name)))
}

/// Resolve a relative import inside a package to a package id.
fn relative_id(importer: &str, source: &str) -> String {
  let mut segments: Vec<&str> = importer.split('/').collect();
  segments.pop();
  for segment in source.split('/') {
    match segment {
      "." | "" => {}
      ".." => {
        segments.pop();
      }
      s => segments.push(s),
    }
  }
  strip_js(&segments.join("/")).to_string()
}

/// Find the file a package id refers to inside `node_modules`.
///
/// `pkg` resolves through `pkg/package.json` (`module`, then `main`), falling
/// back to `pkg/index.js`; `pkg/sub` resolves to `pkg/sub.js`, `pkg/sub` or
/// `pkg/sub/index.js`.
fn resolve_package(node_modules: &FileTree, id: &str) -> Option<String> {
  let segments: Vec<&str> = id.split('/').collect();
  let name_len = if id.starts_with('@') { 2 } else { 1 };
  if segments.len() < name_len {
    return None;
  }

  let name = segments[..name_len].join("/");
  let subpath = segments[name_len..].join("/");

  if subpath.is_empty() {
    let manifest = node_modules
      .get(&format!("{}/package.json", name))
      .and_then(|bytes| serde_json::from_slice::<PackageManifest>(bytes).ok())
      .unwrap_or_default();

    if let Some(entry) = manifest.module.or(manifest.main) {
      let entry = entry.trim_start_matches("./");
      if let Some(found) = file_candidate(node_modules, &format!("{}/{}", name, entry)) {
        return Some(found);
      }
    }
    let index = format!("{}/index.js", name);
    return node_modules.contains(&index).then_some(index);
  }

  file_candidate(node_modules, &format!("{}/{}", name, subpath))
}

fn file_candidate(node_modules: &FileTree, base: &str) -> Option<String> {
  [format!("{}.js", base), base.to_string(), format!("{}/index.js", base)]
    .into_iter()
    .find(|candidate| node_modules.contains(candidate))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::compile::SourcePlugin;
  use std::rc::Rc;

  fn bundle(modules: &FileTree, node_modules: &FileTree, plugins: &[Rc<dyn SourcePlugin>]) -> Result<String, TransformError> {
    let out = AmdBundler.bundle(&BundleInput {
      app_name: "my-app",
      modules,
      node_modules,
      plugins,
    })?;
    Ok(out.get_str(DEFAULT_JS_OUTPUT).unwrap_or_default().to_string())
  }

  struct Banner;

  impl SourcePlugin for Banner {
    fn name(&self) -> &str {
      "banner"
    }

    fn transform(&self, path: &str, code: &str) -> Result<Option<String>, TransformError> {
      Ok(Some(format!("// {}\n{}", path, code)))
    }
  }

  #[test]
  fn wraps_modules_in_path_order_and_requires_entry() {
    let modules = FileTree::from_files([
      ("ui/components/foo/component.js", "export default 1;"),
      ("index.js", "import './config/module-map';"),
      ("ui/index.html", "<html></html>"),
    ])
    .unwrap();

    let js = bundle(&modules, &FileTree::new(), &[]).unwrap();

    assert_eq!(
      js,
      "define(\"my-app/index\", function () {\nimport './config/module-map';\n});\n\
       define(\"my-app/ui/components/foo/component\", function () {\nexport default 1;\n});\n\
       require(\"my-app/index\");\n"
    );
  }

  #[test]
  fn empty_input_produces_no_bundle() {
    let modules = FileTree::from_files([("ui/index.html", "<html></html>")]).unwrap();
    let out = AmdBundler
      .bundle(&BundleInput {
        app_name: "my-app",
        modules: &modules,
        node_modules: &FileTree::new(),
        plugins: &[],
      })
      .unwrap();
    assert!(out.is_empty());
  }

  #[test]
  fn inlines_packages_transitively() {
    let modules = FileTree::from_files([("main.js", "import { tiny } from 'tiny-lib';\nimport '@scope/pkg/extra';")]).unwrap();
    let node_modules = FileTree::from_files([
      ("tiny-lib/package.json", r#"{ "name": "tiny-lib", "module": "./dist/tiny.js" }"#),
      ("tiny-lib/dist/tiny.js", "import { helper } from './helper';\nimport dep from 'dep';"),
      ("tiny-lib/dist/helper.js", "export const helper = 1;"),
      ("dep/index.js", "export default 2;"),
      ("@scope/pkg/extra.js", "export {};"),
    ])
    .unwrap();

    let js = bundle(&modules, &node_modules, &[]).unwrap();

    let order: Vec<&str> = js
      .lines()
      .filter_map(|l| l.strip_prefix("define(\""))
      .map(|l| l.split('"').next().unwrap())
      .collect();
    assert_eq!(
      order,
      vec!["tiny-lib", "@scope/pkg/extra", "tiny-lib/dist/helper", "dep", "my-app/main"]
    );
    assert!(js.ends_with("require(\"my-app/main\");\n"));
  }

  #[test]
  fn unresolved_package_names_importer() {
    let modules = FileTree::from_files([("ui/components/x/component.js", "import missing from 'missing';")]).unwrap();
    let err = bundle(&modules, &FileTree::new(), &[]).unwrap_err();
    assert_eq!(
      err,
      TransformError::UnresolvedPackage {
        path: "ui/components/x/component.js".to_string(),
        package: "missing".to_string(),
      }
    );
  }

  #[test]
  fn import_like_text_is_not_a_dependency() {
    let modules = FileTree::from_files([
      (
        "ui/components/greeting/template.js",
        "export default {\n  id: \"abc\",\n  block: \"<p>Greetings from 'Paris'</p>\",\n};\n",
      ),
      ("index.js", "console.log(\"loaded from 'cache'\");\n"),
    ])
    .unwrap();

    let js = bundle(&modules, &FileTree::new(), &[]).unwrap();

    assert!(js.contains("Greetings from 'Paris'"));
    assert!(js.ends_with("require(\"my-app/index\");\n"));
  }

  #[test]
  fn reexports_pull_in_packages() {
    let modules = FileTree::from_files([("index.js", "export * from 'tiny-lib';\nexport { x } from 'dep';")]).unwrap();
    let node_modules =
      FileTree::from_files([("tiny-lib/index.js", "export const t = 1;"), ("dep/index.js", "export const x = 2;")]).unwrap();

    let js = bundle(&modules, &node_modules, &[]).unwrap();

    assert!(js.starts_with("define(\"tiny-lib\", function () {\n"));
    assert!(js.contains("define(\"dep\", function () {\n"));
  }

  #[test]
  fn app_self_imports_are_not_packages() {
    let modules = FileTree::from_files([("index.js", "import map from 'my-app/config/module-map';")]).unwrap();
    assert!(bundle(&modules, &FileTree::new(), &[]).is_ok());
  }

  #[test]
  fn plugins_see_every_module() {
    let modules = FileTree::from_files([("a.js", "a();"), ("b.js", "b();")]).unwrap();
    let plugins: Vec<Rc<dyn SourcePlugin>> = vec![Rc::new(Banner)];
    let js = bundle(&modules, &FileTree::new(), &plugins).unwrap();
    assert!(js.contains("// a.js\na();"));
    assert!(js.contains("// b.js\nb();"));
  }
}
