//! Commands run end to end through the parsed CLI

#![allow(clippy::unwrap_used, clippy::expect_used)]

use clap::Parser;
use ops_cli::{check_config, run, Cli};
use std::io::Write;

const PLATFORM: &str = r#"
domains: [example.com]
mail:
  operators: [ops@example.com, billing@example.com]
subscription_levels:
  - handle: free
    name: Free
    price: 0
    resources:
      people: 3
  - handle: gold
    name: Gold
    price: "200.00"
    resources:
      people: unlimited
"#;

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_check_config_reports_catalogue() {
    let file = config_file(PLATFORM);
    let report = check_config(file.path()).unwrap();

    assert_eq!(report.domains, vec!["example.com"]);
    assert_eq!(report.levels, vec!["free", "gold"]);
    assert_eq!(report.operators, 2);
    assert!(!report.gateway_url.is_empty());
}

#[test]
fn test_check_config_rejects_invalid_and_missing_files() {
    let file = config_file("domains: []\n");
    assert!(check_config(file.path()).is_err());

    let missing = std::env::temp_dir().join("saas-ops-does-not-exist.yaml");
    let err = check_config(&missing).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_roles_command_as_json() {
    let cli = Cli::try_parse_from([
        "saas-ops",
        "--format",
        "json",
        "roles",
        "account_admin|billing",
        "--role",
        "billing",
    ])
    .unwrap();

    let rendered: serde_json::Value = serde_json::from_str(&run(&cli).unwrap()).unwrap();
    assert_eq!(rendered["allowed"], true);
    assert_eq!(rendered["roles"], serde_json::json!(["billing"]));
}

#[test]
fn test_schedule_command_as_table() {
    let cli = Cli::try_parse_from([
        "saas-ops",
        "schedule",
        "--anchor",
        "2007-03-19",
        "--cancelled-at",
        "2007-09-23T00:00:00Z",
        "--at",
        "2007-10-19T00:00:00Z",
    ])
    .unwrap();

    let table = run(&cli).unwrap();
    assert!(table.contains("cancelled_pending_expiry"));
    assert!(table.contains("2007-10-19T00:00:00Z"));
}

#[test]
fn test_malformed_expression_fails() {
    let cli = Cli::try_parse_from(["saas-ops", "roles", "(a|b"]).unwrap();
    assert!(run(&cli).is_err());
}
