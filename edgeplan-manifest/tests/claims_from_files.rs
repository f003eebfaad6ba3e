//! Config + bundle on disk -> claims, the way a run assembles them.

use std::fs;
use std::path::Path;

use edgeplan_core::{EnvName, RoutePattern, UnitName};
use edgeplan_manifest::{build_claims, expand_aliases, load_bundle, load_config, HostAlias};
use rstest::rstest;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, content).expect("write fixture");
}

#[test]
fn claims_follow_config_environments() {
    let dir = TempDir::new().expect("tempdir");
    write(
        dir.path(),
        "edgeplan.yaml",
        r#"
environments:
  staging:
    account_id: "acc-s"
    aliases:
      - alias: "@app"
        hosts: ["app.staging.example.com"]
  production:
    account_id: "acc-p"
    aliases:
      - alias: "@app"
        hosts: ["app.example.com", "www.example.com"]
"#,
    );
    write(
        dir.path(),
        "bundle/journeys.yaml",
        "targets:\n  - {name: edge, type: cloudflare, enabled: true}\n",
    );
    write(
        dir.path(),
        "bundle/edge/workers.json",
        r#"{"worker_routes": [{"pattern": "@app/login*", "script_name": "login"}]}"#,
    );

    let config = load_config(&dir.path().join("edgeplan.yaml")).expect("config");
    let envs = config.environments(None).expect("environments");
    let bundle = load_bundle(&dir.path().join("bundle")).expect("bundle");
    let claims = build_claims(&bundle.targets[0], &envs);

    let login = &claims[&UnitName::from("login")];
    assert_eq!(
        login.routes_for(&EnvName::from("production")),
        &[
            RoutePattern::from("app.example.com/login*"),
            RoutePattern::from("www.example.com/login*"),
        ]
    );
    assert_eq!(
        login.routes_for(&EnvName::from("staging")),
        &[RoutePattern::from("app.staging.example.com/login*")]
    );
}

#[rstest]
#[case("@app/x", "h.com/x")]
#[case("@app", "h.com")]
#[case("@app/", "h.com/")]
#[case("other.com/@app", "other.com/@app")]
fn alias_substitution(#[case] pattern: &str, #[case] expected: &str) {
    let aliases = [HostAlias {
        alias: "@app".to_string(),
        hosts: vec!["h.com".to_string()],
    }];
    assert_eq!(
        expand_aliases(&RoutePattern::from(pattern), &aliases),
        vec![RoutePattern::from(expected)]
    );
}
