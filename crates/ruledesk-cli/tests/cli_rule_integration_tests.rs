//! CLI rule command integration tests

use ruledesk_core::storage::RuleStorage;
use ruledesk_store::SqliteRuleStorage;
use ruledesk_store::db::DEFAULT_BUSY_TIMEOUT;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn ruledesk(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ruledesk-cli"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "CLI command should succeed. Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_cli_create_publish_show() {
    // Given a rule file
    let temp_dir = TempDir::new().unwrap();
    let rule_file = temp_dir.path().join("late_fee.yaml");
    fs::write(&rule_file, "Name: late fee # billing\n").unwrap();

    // When it is created and published through the CLI
    let created = stdout(&ruledesk(
        temp_dir.path(),
        &["rule", "create", "--file", rule_file.to_str().unwrap()],
    ));
    let id = created
        .lines()
        .find_map(|l| l.trim().strip_prefix("id: "))
        .expect("created id")
        .to_string();
    let published = stdout(&ruledesk(temp_dir.path(), &["rule", "publish", &id]));

    // Then the default database holds the published text
    assert!(published.contains("core_id: CORE-000001"));
    let shown = stdout(&ruledesk(temp_dir.path(), &["rule", "show", &id]));
    assert_eq!(
        shown,
        "Name: late fee # billing\nCore:\n  Id: CORE-000001\n  Status: Published\n"
    );
    assert!(temp_dir.path().join(".ruledesk/rules.db").exists());
}

#[test]
fn test_cli_list_and_history_with_db_flag() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("custom.db");
    let rule_id = {
        let storage = SqliteRuleStorage::open(&db_path, DEFAULT_BUSY_TIMEOUT).unwrap();
        let rule = storage
            .create_rule("Name: a\n".to_string(), serde_json::json!({"Name": "a"}))
            .unwrap();
        rule.id
    };
    let update_file = temp_dir.path().join("b.yaml");
    fs::write(&update_file, "Name: b\n").unwrap();
    let db = db_path.to_str().unwrap();

    stdout(&ruledesk(
        temp_dir.path(),
        &["rule", "--db", db, "update", &rule_id, "--file", update_file.to_str().unwrap()],
    ));
    let listed = stdout(&ruledesk(temp_dir.path(), &["rule", "--db", db, "list"]));
    let history = stdout(&ruledesk(temp_dir.path(), &["rule", "--db", db, "history", &rule_id]));

    assert!(listed.contains(&rule_id));
    assert!(listed.contains("rev 2"));
    assert!(history.starts_with("--- revision 1"));
    assert!(history.contains("Name: a\n"));
}

#[test]
fn test_cli_publish_unknown_rule_fails() {
    let temp_dir = TempDir::new().unwrap();

    let output = ruledesk(temp_dir.path(), &["rule", "publish", "missing"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_NOT_FOUND"));
}
