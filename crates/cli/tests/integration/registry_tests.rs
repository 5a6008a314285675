//! Registry command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn registry_lists_identifiers() {
  let env = TestEnv::new();
  env.write_file("src/ui/components/foo-bar/component.js", "");
  env.write_file("src/ui/components/foo-bar/template.hbs", "");

  env
    .arbor_cmd()
    .arg("registry")
    .arg(env.project_path())
    .assert()
    .success()
    .stdout(predicate::str::contains("2 module(s) registered"))
    .stdout(predicate::str::contains("component:/app-name/foo-bar"))
    .stdout(predicate::str::contains("template:/app-name/foo-bar"));
}

#[test]
fn registry_json_includes_resolver_configuration() {
  let env = TestEnv::new();
  env.write_file("src/ui/components/x.js", "");

  let output = env
    .arbor_cmd()
    .arg("registry")
    .arg(env.project_path())
    .arg("--format")
    .arg("json")
    .output()
    .unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["modules"][0]["identifier"], "component:/app-name/x");
  assert_eq!(json["modules"][0]["specifier"], "ui/components/x");
  assert_eq!(json["resolver"]["app"]["rootName"], "app-name");
}
