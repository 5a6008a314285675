//! Build command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn build_writes_assembled_output() {
  let env = TestEnv::new();
  env.write_file("src/index.js", "export default 1;\n");
  env.write_file("src/ui/styles/app.css", "body {}\n");
  env.write_file("public/robots.txt", "User-agent: *\n");

  env.build_cmd().assert().success().stdout(predicate::str::contains("Files: 4"));

  assert_eq!(env.read_output("index.html"), r#"<script src="/app.js"></script>"#);
  assert!(env.read_output("app.js").contains("define(\"app-name/index\""));
  assert_eq!(env.read_output("app.css"), "/* app.css */\nbody {}\n");
  assert_eq!(env.read_output("robots.txt"), "User-agent: *\n");
}

#[test]
fn second_build_skips_unchanged_output() {
  let env = TestEnv::new();

  env.build_cmd().assert().success();
  env
    .build_cmd()
    .assert()
    .success()
    .stdout(predicate::str::contains("Output unchanged"));
}

#[test]
fn rebuild_replaces_stale_files() {
  let env = TestEnv::new();
  env.write_file("public/old.txt", "old");
  env.build_cmd().assert().success();
  assert!(env.output_path().join("old.txt").exists());

  std::fs::remove_file(env.project_path().join("public/old.txt")).unwrap();
  env.build_cmd().assert().success();

  assert!(!env.output_path().join("old.txt").exists());
  assert!(env.output_path().join("index.html").exists());
}

#[test]
fn environment_flag_and_variable() {
  let env = TestEnv::new();
  env.write_file(
    "config/environment.json",
    r#"{ "rootURL": "/", "environments": { "production": { "rootURL": "/prod/" } } }"#,
  );

  env.build_cmd().arg("-e").arg("production").assert().success();
  assert_eq!(env.read_output("index.html"), r#"<script src="/prod/app.js"></script>"#);

  env
    .build_cmd()
    .env("ARBOR_ENV", "development")
    .assert()
    .success()
    .stdout(predicate::str::contains("(development)"));
  assert_eq!(env.read_output("index.html"), r#"<script src="/app.js"></script>"#);

  env
    .build_cmd()
    .env("ARBOR_ENV", "production")
    .assert()
    .success()
    .stdout(predicate::str::contains("(production)"));
}

#[test]
fn json_format_reports_files_and_stages() {
  let env = TestEnv::new();

  let output = env.build_cmd().arg("--format").arg("json").output().unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["app"], "app-name");
  assert_eq!(json["environment"], "development");
  assert_eq!(json["files"], serde_json::json!(["index.html"]));
  assert_eq!(json["stages"].as_array().unwrap().len(), 6);
}

#[test]
fn lint_output_is_written_separately() {
  let env = TestEnv::new();
  env.write_file(
    "addons/lint.lua",
    r#"return { name = "lint", lintTree = function(type, tree) return { [type .. ".txt"] = "ok" } end }"#,
  );
  env.write_file("arbor.json", r#"{ "addons": ["addons/lint.lua"] }"#);
  let lint_dir = env.project_path().join("lint-results");

  env
    .build_cmd()
    .arg("--lint-output")
    .arg(&lint_dir)
    .assert()
    .success()
    .stderr(predicate::str::contains("Lint produced 2 result file(s)"));

  assert!(lint_dir.join("src.txt").exists());
  assert!(lint_dir.join("templates.txt").exists());
  assert!(!env.output_path().join("src.txt").exists());
}

#[test]
fn failing_stage_is_named() {
  let env = TestEnv::new();
  env.write_file("src/ui/components/a.js", "");
  env.write_file("src/ui/components/a/component.js", "");

  env
    .build_cmd()
    .assert()
    .failure()
    .stderr(predicate::str::contains("stage 'module-registry' failed"));

  assert!(!env.output_path().exists());
}

#[test]
fn output_over_sources_is_refused() {
  let env = TestEnv::new();
  env.write_file("src/index.js", "export default 1;\n");

  for dest in [env.project_path().join("src"), env.project_path()] {
    env
      .arbor_cmd()
      .arg("build")
      .arg(env.project_path())
      .arg("-o")
      .arg(&dest)
      .assert()
      .failure()
      .stderr(predicate::str::contains("Output directory"));
  }

  assert!(env.project_path().join("src/index.js").exists());
  assert!(env.project_path().join("src/ui/index.html").exists());
  assert!(env.project_path().join("package.json").exists());
}
