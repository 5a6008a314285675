//! Lua addons and plugins declared in `arbor.json`.

use arbor_lib::{AddonError, BuildError, Environment, LintPolicy};

use super::common::ProjectFixture;

const ARBOR_JSON: &str = r#"{
  "addons": ["addons/a.lua", "addons/b.lua", "addons/c.lua"]
}"#;

fn tagging_addon(name: &str) -> String {
  format!(
    r#"
      return {{
        name = "{name}",
        preprocessTree = function(type, tree)
          if type ~= "js" then return nil end
          tree["order.js"] = (tree["order.js"] or "") .. "{name}"
          return tree
        end,
      }}
    "#
  )
}

#[test]
fn preprocess_hooks_thread_in_declared_order() {
  let project = ProjectFixture::new();
  project.write("arbor.json", ARBOR_JSON);
  for name in ["a", "b", "c"] {
    project.write(&format!("addons/{}.lua", name), &tagging_addon(name));
  }

  let out = project.build().unwrap();
  let js = out.tree.get_str("app.js").unwrap();

  assert!(js.contains("define(\"app-name/order\", function () {\nabc\n});"), "{}", js);
}

#[test]
fn addon_public_tree_merges_with_project_public() {
  let project = ProjectFixture::new();
  project.write("public/robots.txt", "User-agent: *\n");
  project.write("addons/brand/public/brand/logo.svg", "<svg/>");
  project.write(
    "addons/brand/index.lua",
    r#"return { name = "brand", treeFor = function(type) return "public" end }"#,
  );
  project.write("arbor.json", r#"{ "addons": ["addons/brand/index.lua"] }"#);

  let out = project.build().unwrap();

  assert_eq!(out.tree.get_str("brand/logo.svg"), Some("<svg/>"));
  assert_eq!(out.tree.get_str("robots.txt"), Some("User-agent: *\n"));
}

#[test]
fn addon_public_collision_is_an_error() {
  let project = ProjectFixture::new();
  project.write("public/robots.txt", "project");
  project.write(
    "addons/seo.lua",
    r#"return { name = "seo", treeFor = function(type) return { ["robots.txt"] = "addon" } end }"#,
  );
  project.write("arbor.json", r#"{ "addons": ["addons/seo.lua"] }"#);

  let err = project.build().unwrap_err();
  assert_eq!(
    err.to_string(),
    "stage 'public' failed: conflicting output paths: 'robots.txt' is produced by both project public and addon 'seo'"
  );
}

#[test]
fn lint_results_are_returned_beside_output() {
  let project = ProjectFixture::new();
  project.write("src/ui/components/x/template.hbs", "<p></p>");
  project.write(
    "addons/lint.lua",
    r#"
      return {
        name = "template-lint",
        lintTree = function(type, tree)
          local count = 0
          for _ in pairs(tree) do count = count + 1 end
          return { [type .. "/report.txt"] = tostring(count) }
        end,
      }
    "#,
  );
  project.write("arbor.json", r#"{ "addons": ["addons/lint.lua"] }"#);

  let linted = project
    .builder(Environment::Development, LintPolicy::Enabled)
    .unwrap()
    .build()
    .unwrap();
  assert_eq!(linted.lint.get_str("src/report.txt"), Some("2"));
  assert_eq!(linted.lint.get_str("templates/report.txt"), Some("1"));
  assert!(!linted.tree.contains("src/report.txt"));

  let unlinted = project.build().unwrap();
  assert!(unlinted.lint.is_empty());
}

#[test]
fn invalid_addon_shape_fails_at_construction() {
  let project = ProjectFixture::new();
  project.write("addons/bad.lua", r#"return { name = "bad", preprocessTree = "not a function" }"#);
  project.write("arbor.json", r#"{ "addons": ["addons/bad.lua"] }"#);

  let err = project
    .builder(Environment::Development, LintPolicy::Disabled)
    .unwrap_err();
  assert!(matches!(err, BuildError::Addon(AddonError::InvalidShape { .. })), "{:?}", err);
}

#[test]
fn duplicate_addon_names_fail_at_construction() {
  let project = ProjectFixture::new();
  project.write("addons/one.lua", r#"return { name = "same" }"#);
  project.write("addons/two.lua", r#"return { name = "same" }"#);
  project.write("arbor.json", r#"{ "addons": ["addons/one.lua", "addons/two.lua"] }"#);

  let err = project
    .builder(Environment::Development, LintPolicy::Disabled)
    .unwrap_err();
  assert!(matches!(err, BuildError::Addon(AddonError::Duplicate(_))));
}

#[test]
fn babel_and_rollup_plugins_apply() {
  let project = ProjectFixture::new();
  project.write("src/index.js", "run();\nconsole.log('debug');\n");
  project.write(
    "plugins/strip-logs.lua",
    r#"return function(path, code) return (code:gsub("console%.log%b();?\n?", "")) end"#,
  );
  project.write(
    "plugins/banner.lua",
    r#"return { name = "banner", transform = function(path, code) return "// " .. path .. "\n" .. code end }"#,
  );
  project.write(
    "arbor.json",
    r#"{ "babel": { "plugins": ["plugins/strip-logs.lua"] }, "rollup": { "plugins": ["plugins/banner.lua"] } }"#,
  );

  let out = project.build().unwrap();
  let js = out.tree.get_str("app.js").unwrap();

  assert!(!js.contains("console.log"));
  assert!(js.contains("define(\"app-name/index\", function () {\n// index.js\nrun();\n});"), "{}", js);
}

#[test]
fn postprocess_all_runs_after_assembly() {
  let project = ProjectFixture::new();
  project.write(
    "addons/manifest.lua",
    r#"
      return {
        name = "manifest",
        postprocessTree = function(type, tree)
          if type ~= "all" then return nil end
          local paths = {}
          for path in pairs(tree) do table.insert(paths, path) end
          table.sort(paths)
          tree["manifest.txt"] = table.concat(paths, ",")
          return tree
        end,
      }
    "#,
  );
  project.write("arbor.json", r#"{ "addons": ["addons/manifest.lua"] }"#);

  let out = project.build().unwrap();
  assert_eq!(out.tree.get_str("manifest.txt"), Some("index.html"));
}
