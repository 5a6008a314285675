//! Module registry derivation through the pipeline.

use arbor_lib::{Environment, LintPolicy};

use super::common::ProjectFixture;

#[test]
fn registry_covers_components_and_skips_private_and_utils() {
  let project = ProjectFixture::new();
  project.write("src/ui/components/foo-bar/component.js", "");
  project.write("src/ui/components/foo-bar/template.hbs", "");
  project.write("src/ui/components/x/y/helper.js", "");
  project.write("src/ui/components/single.js", "");
  project.write("src/ui/components/-private/thing.js", "");
  project.write("src/utils/format.js", "");

  let registry = project
    .builder(Environment::Development, LintPolicy::Disabled)
    .unwrap()
    .registry()
    .unwrap();

  let identifiers: Vec<&str> = registry.entries().map(|e| e.identifier.as_str()).collect();
  assert_eq!(
    identifiers,
    vec![
      "component:/app-name/foo-bar",
      "component:/app-name/single",
      "helper:/app-name/x/y",
      "template:/app-name/foo-bar",
    ]
  );
}

#[test]
fn template_and_script_with_same_output_collide() {
  let project = ProjectFixture::new();
  project.write("src/ui/components/foo/template.js", "");
  project.write("src/ui/components/foo/template.hbs", "");

  let err = project.build().unwrap_err();
  assert!(err.to_string().starts_with("stage 'script-compile' failed:"), "{}", err);
}

#[test]
fn duplicate_identifiers_fail_the_build() {
  let project = ProjectFixture::new();
  project.write("src/ui/components/foo.js", "");
  project.write("src/ui/components/foo/component.js", "");

  let err = project.build().unwrap_err();
  let message = err.to_string();
  assert!(message.contains("ambiguous module registration"), "{}", message);
  assert!(message.contains("ui/components/foo.js") || message.contains("ui/components/foo/component"));
}

#[test]
fn generated_modules_are_bundled() {
  let project = ProjectFixture::new();
  project.write("src/ui/components/foo/component.js", "export default class {}");

  let out = project.build().unwrap();
  let js = out.tree.get_str("app.js").unwrap();

  assert!(js.contains("import __module0__ from '../ui/components/foo/component';"));
  assert!(js.contains("\"component:/app-name/foo\": __module0__"));
  assert!(js.contains("\"rootName\": \"app-name\""));
}
