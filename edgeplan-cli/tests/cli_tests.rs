use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const CONFIG: &str = r#"
existing_workers:
  - "legacy/*.toml"
environments:
  staging:
    account_id: "acc-staging"
    aliases:
      - alias: "@shop"
        hosts: ["shop.staging.example.com"]
"#;

const LEGACY: &str = r#"name = "legacy-shop"

[env.staging]
routes = ["shop.staging.example.com/*"]
"#;

fn edgeplan_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("edgeplan"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env_remove("RUST_LOG");
    cmd
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, content).expect("write");
}

fn workspace() -> TempDir {
    let dir = TempDir::new().expect("workspace");
    write(dir.path(), "edgeplan.yaml", CONFIG);
    write(dir.path(), "legacy/shop.toml", LEGACY);
    write(
        dir.path(),
        "bundle/journeys.yaml",
        "targets:\n  - {name: cf_main, type: cloudflare, enabled: true}\n",
    );
    write(
        dir.path(),
        "bundle/cf_main/workers.json",
        r#"{"worker_routes": [
  {"pattern": "@shop/checkout*", "script_name": "checkout"},
  {"pattern": "@shop/*", "script_name": "home"}
]}"#,
    );
    dir
}

#[test]
fn check_prints_relation() {
    let home = TempDir::new().expect("home");
    edgeplan_cmd(home.path())
        .args(["check", "example.com/*", "example.com/api*"])
        .assert()
        .success()
        .stdout(contains("covered-by"));
    edgeplan_cmd(home.path())
        .args(["check", "a.com/x", "b.com/y"])
        .assert()
        .success()
        .stdout(contains("disjoint"));
}

#[test]
fn plan_uses_config_from_working_directory() {
    let home = TempDir::new().expect("home");
    let ws = workspace();

    edgeplan_cmd(home.path())
        .current_dir(ws.path())
        .args(["plan", "bundle"])
        .assert()
        .success()
        .stdout(contains("2 worker plan(s) (2 written, 0 unchanged)"))
        .stdout(contains("wrangler deploy -e staging"));

    assert!(ws.path().join("bundle/cf_main/home/deployment.json").exists());
    let legacy = fs::read_to_string(ws.path().join("legacy/shop.toml")).expect("legacy");
    assert!(legacy.contains("edgeplan_original_routes"));

    edgeplan_cmd(home.path())
        .current_dir(ws.path())
        .args(["plan", "bundle"])
        .assert()
        .success()
        .stdout(contains("(0 written, 2 unchanged)"));
}

#[test]
fn verbose_flag_logs_chosen_config_to_stderr() {
    let home = TempDir::new().expect("home");
    let ws = workspace();

    edgeplan_cmd(home.path())
        .current_dir(ws.path())
        .args(["-v", "routes", "bundle"])
        .assert()
        .success()
        .stderr(contains("using config"))
        .stderr(contains("edgeplan.yaml"));

    edgeplan_cmd(home.path())
        .current_dir(ws.path())
        .args(["routes", "bundle"])
        .assert()
        .success()
        .stderr(contains("using config").not());
}

#[test]
fn dry_run_and_diff_write_nothing() {
    let home = TempDir::new().expect("home");
    let ws = workspace();
    let config = ws.path().join("edgeplan.yaml");
    let bundle = ws.path().join("bundle");

    edgeplan_cmd(home.path())
        .arg("plan")
        .arg(&bundle)
        .arg("--config")
        .arg(&config)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(contains("[dry-run]"));
    assert!(!bundle.join("cf_main/home/deployment.json").exists());

    edgeplan_cmd(home.path())
        .arg("diff")
        .arg(&bundle)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(contains("+++ b/cf_main/home/deployment.json"))
        .stdout(contains("--- a/legacy/shop.toml"));
    assert_eq!(
        fs::read_to_string(ws.path().join("legacy/shop.toml")).expect("legacy"),
        LEGACY
    );

    edgeplan_cmd(home.path())
        .arg("plan")
        .arg(&bundle)
        .arg("--config")
        .arg(&config)
        .assert()
        .success();
    edgeplan_cmd(home.path())
        .arg("diff")
        .arg(&bundle)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(contains("No differences."));
}

#[test]
fn routes_json_reports_upstream() {
    let home = TempDir::new().expect("home");
    let ws = workspace();

    let assert = edgeplan_cmd(home.path())
        .current_dir(ws.path())
        .args(["routes", "bundle", "--json"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let rows: serde_json::Value = serde_json::from_str(&stdout).expect("json");
    let rows = rows.as_array().expect("array");
    assert_eq!(rows.len(), 2);
    assert!(rows
        .iter()
        .all(|row| row["upstream"] == serde_json::json!("legacy-shop")));
    assert!(!ws.path().join("bundle/cf_main/checkout/deployment.json").exists());
}

#[test]
fn conflict_fails_with_message() {
    let home = TempDir::new().expect("home");
    let ws = workspace();
    write(
        ws.path(),
        "bundle/cf_main/workers.json",
        r#"{"worker_routes": [{"pattern": "shop.staging.example.com*", "script_name": "greedy"}]}"#,
    );

    edgeplan_cmd(home.path())
        .current_dir(ws.path())
        .args(["plan", "bundle"])
        .assert()
        .failure()
        .stderr(contains("legacy-shop"));
    assert!(!ws.path().join("bundle/cf_main/greedy/deployment.json").exists());
}

#[test]
fn missing_config_is_reported() {
    let home = TempDir::new().expect("home");
    let empty = TempDir::new().expect("cwd");

    edgeplan_cmd(home.path())
        .current_dir(empty.path())
        .args(["plan", "bundle"])
        .assert()
        .failure()
        .stderr(contains("edgeplan config"));
}
