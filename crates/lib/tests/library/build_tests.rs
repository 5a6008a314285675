//! End-to-end builds of projects on disk.

use arbor_lib::tree::FileTree;
use arbor_lib::util::hash::hash_directory;
use arbor_lib::{BuildError, ConfigError, Environment, LintPolicy};

use super::common::ProjectFixture;

#[test]
fn minimal_project_outputs_only_index_html() {
  let project = ProjectFixture::new();

  let out = project.build().unwrap();

  assert_eq!(
    out.tree,
    FileTree::from_files([("index.html", "<html></html>")]).unwrap()
  );
}

#[test]
fn root_url_comes_from_environment_override() {
  let project = ProjectFixture::new();
  project.write("src/ui/index.html", r#"<base href="{{rootURL}}">"#);
  project.write(
    "config/environment.json",
    r#"{ "rootURL": "/", "environments": { "production": { "rootURL": "/foo/" } } }"#,
  );

  let dev = project.build().unwrap();
  let prod = project
    .builder(Environment::Production, LintPolicy::Disabled)
    .unwrap()
    .build()
    .unwrap();

  assert_eq!(dev.tree.get_str("index.html"), Some(r#"<base href="/">"#));
  assert_eq!(prod.tree.get_str("index.html"), Some(r#"<base href="/foo/">"#));
}

#[test]
fn full_project_layout() {
  let project = ProjectFixture::new();
  project.write("src/index.js", "import Application from './app';\n");
  project.write("src/app.js", "import { tick } from 'tiny-clock';\nexport default tick;\n");
  project.write("src/ui/components/site-header/component.ts", "export default class {}\n");
  project.write("src/ui/components/site-header/template.hbs", "<header></header>\n");
  project.write("src/ui/styles/app.css", "body { margin: 0; }\n");
  project.write("public/robots.txt", "User-agent: *\n");
  project.write("node_modules/tiny-clock/package.json", r#"{ "main": "clock.js" }"#);
  project.write("node_modules/tiny-clock/clock.js", "export function tick() {}\n");

  let out = project.build().unwrap();

  assert_eq!(
    out.tree.paths().collect::<Vec<_>>(),
    vec!["app.css", "app.js", "index.html", "robots.txt"]
  );
  let js = out.tree.get_str("app.js").unwrap();
  assert!(js.starts_with("define(\"tiny-clock\""), "packages come first:\n{}", js);
  assert!(js.contains("define(\"app-name/ui/components/site-header/component\""));
  assert_eq!(out.registry.len(), 2);
}

#[test]
fn arbor_json_renames_outputs() {
  let project = ProjectFixture::new();
  project.write("src/ui/styles/app.css", "a {}");
  project.write("src/index.js", "");
  project.write(
    "arbor.json",
    r#"{ "outputPaths": { "app": { "css": "foo-bar.css", "js": "assets/app-name.js", "html": "main.html" } } }"#,
  );

  let out = project.build().unwrap();

  assert_eq!(
    out.tree.paths().collect::<Vec<_>>(),
    vec!["assets/app-name.js", "foo-bar.css", "main.html"]
  );
}

#[test]
fn arbor_json_overrides_source_root() {
  let project = ProjectFixture::new();
  project.write("app/ui/index.html", "from app/");
  project.write("arbor.json", r#"{ "trees": { "src": "app" } }"#);

  let out = project.build().unwrap();
  assert_eq!(out.tree.get_str("index.html"), Some("from app/"));
}

#[test]
fn missing_source_root_is_configuration_error() {
  let project = ProjectFixture::new();
  project.write("arbor.json", r#"{ "trees": { "src": "missing" } }"#);

  let err = project
    .builder(Environment::Development, LintPolicy::Disabled)
    .unwrap_err();
  assert!(matches!(err, BuildError::Config(ConfigError::MissingSourceRoot(_))));
}

#[test]
fn unknown_build_config_key_is_rejected() {
  let project = ProjectFixture::new();
  project.write("arbor.json", r#"{ "fingerprint": true }"#);

  let err = project
    .builder(Environment::Development, LintPolicy::Disabled)
    .unwrap_err();
  assert!(matches!(err, BuildError::Config(ConfigError::Parse { .. })));
}

#[test]
fn public_collision_with_html_is_fatal() {
  let project = ProjectFixture::new();
  project.write("public/index.html", "static");

  let err = project.build().unwrap_err();
  assert!(matches!(err, BuildError::Assemble(_)));
  assert!(err.to_string().contains("conflicting output paths"));
}

#[test]
fn written_output_hash_matches_tree_hash() {
  let project = ProjectFixture::new();
  project.write("src/index.js", "export default 1;");
  project.write("public/img/logo.svg", "<svg/>");

  let out = project.build().unwrap();
  let dest = project.root().join("dist");
  out.tree.write_to(&dest).unwrap();

  assert_eq!(hash_directory(&dest, &[]).unwrap(), out.tree.content_hash());

  let again = project.build().unwrap();
  assert_eq!(again.tree.content_hash(), out.tree.content_hash());
}

#[test]
fn feature_flags_reach_scripts() {
  let project = ProjectFixture::new();
  project.write(
    "config/environment.json",
    r#"{ "featureFlags": { "NEW_NAV": false }, "environments": { "test": { "featureFlags": { "NEW_NAV": true } } } }"#,
  );
  project.write(
    "src/index.js",
    "import { NEW_NAV } from '@arbor/features';\nif (NEW_NAV) { nav(); }\n",
  );

  let out = project
    .builder(Environment::Test, LintPolicy::Disabled)
    .unwrap()
    .build()
    .unwrap();

  assert!(out.tree.get_str("app.js").unwrap().contains("const NEW_NAV = true;"));
}

#[test]
fn styles_and_node_modules_trees_can_be_relocated() {
  let project = ProjectFixture::new();
  project.write("src/index.js", "import { tick } from 'tiny-clock';\ntick();\n");
  project.write("src/ui/styles/app.css", ".default-location {}\n");
  project.write("design/tokens.css", ".relocated {}\n");
  project.write("node_modules/tiny-clock/index.js", "export function tick() { return 'default'; }\n");
  project.write("vendor/js/tiny-clock/index.js", "export function tick() { return 'vendored'; }\n");
  project.write(
    "arbor.json",
    r#"{ "trees": { "styles": "design", "nodeModules": "vendor/js" } }"#,
  );

  let out = project.build().unwrap();

  let css = out.tree.get_str("app.css").unwrap();
  assert!(css.contains(".relocated {}"), "{}", css);
  assert!(!css.contains(".default-location"), "{}", css);

  let js = out.tree.get_str("app.js").unwrap();
  assert!(js.contains("return 'vendored';"), "{}", js);
  assert!(!js.contains("return 'default';"), "{}", js);
}

#[test]
fn template_text_resembling_an_import_builds() {
  let project = ProjectFixture::new();
  project.write("src/ui/components/greeting/template.hbs", "<p>Greetings from 'Paris'</p>\n");
  project.write("src/index.js", "console.log(\"loaded from 'cache'\");\n");

  let out = project.build().unwrap();

  let js = out.tree.get_str("app.js").unwrap();
  assert!(js.contains("Greetings from 'Paris'"), "{}", js);
  assert!(js.contains("define(\"app-name/ui/components/greeting/template\""));
}
