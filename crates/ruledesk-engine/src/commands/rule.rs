//! Rule CRUD commands
//!
//! Content is parsed on every write so the stored JSON projection always
//! matches the stored text. Plain updates are last-write-wins; only
//! publish checks the revision.

#![allow(clippy::result_large_err)]

use ruledesk_core::document::Document;
use ruledesk_core::errors::ExResult as Result;
use ruledesk_core::model::{Rule, RulePatch, RuleSnapshot, RuleSummary};
use ruledesk_core::storage::RuleStorage;
use std::time::Instant;

fn logged<T>(op: &'static str, rule_id: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let start = Instant::now();
    ruledesk_core::log_op_start!(op, rule = rule_id);
    let result = f();
    match &result {
        Ok(_) => ruledesk_core::log_op_end!(op, start, rule = rule_id),
        Err(e) => ruledesk_core::log_op_error!(op, e.clone(), start, rule = rule_id),
    }
    result
}

/// Parse `content` and return it together with its JSON projection
fn project(content: &str) -> Result<serde_json::Value> {
    Ok(Document::parse(content)?.to_json()?)
}

/// Create a rule from raw text
///
/// # Errors
///
/// `ExErrorKind::Parse` for malformed content, storage errors otherwise.
pub fn create_rule(content: &str, storage: &dyn RuleStorage) -> Result<Rule> {
    let start = Instant::now();
    ruledesk_core::log_op_start!("create_rule");
    let result = project(content).and_then(|json| storage.create_rule(content.to_string(), json));
    match &result {
        Ok(rule) => ruledesk_core::log_op_end!("create_rule", start, rule = rule.id),
        Err(e) => ruledesk_core::log_op_error!("create_rule", e.clone(), start),
    }
    result
}

/// Replace a rule's content (last write wins)
///
/// # Errors
///
/// `ExErrorKind::NotFound`, `ExErrorKind::Parse`, or a storage failure.
pub fn update_rule(rule_id: &str, content: &str, storage: &dyn RuleStorage) -> Result<Rule> {
    logged("update_rule", rule_id, || {
        let json = project(content).map_err(|e| e.with_entity_id(rule_id))?;
        storage.patch_rule(rule_id, RulePatch::new(content, json))
    })
}

/// # Errors
///
/// `ExErrorKind::NotFound` for an unknown id.
pub fn delete_rule(rule_id: &str, storage: &dyn RuleStorage) -> Result<()> {
    logged("delete_rule", rule_id, || storage.delete_rule(rule_id))
}

/// # Errors
///
/// `ExErrorKind::NotFound` for an unknown id.
pub fn get_rule(rule_id: &str, storage: &dyn RuleStorage) -> Result<Rule> {
    storage.get_rule(rule_id)
}

/// # Errors
///
/// Storage failures only.
pub fn list_rules(storage: &dyn RuleStorage) -> Result<Vec<RuleSummary>> {
    storage.list_rules()
}

/// Earlier versions of a rule, oldest first
///
/// # Errors
///
/// `ExErrorKind::NotFound` for an unknown id.
pub fn rule_history(rule_id: &str, storage: &dyn RuleStorage) -> Result<Vec<RuleSnapshot>> {
    Ok(storage.get_rule(rule_id)?.history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruledesk_core::errors::ExErrorKind;
    use ruledesk_core::storage::MemoryRuleStorage;

    #[test]
    fn test_create_projects_json() {
        let storage = MemoryRuleStorage::new();
        let rule = create_rule("Name: x # c\nCore:\n  Status: Draft\n", &storage).unwrap();
        assert_eq!(rule.content, "Name: x # c\nCore:\n  Status: Draft\n");
        assert_eq!(rule.json["Name"], "x");
        assert_eq!(rule.json["Core"]["Status"], "Draft");
        assert_eq!(rule.revision, 1);
    }

    #[test]
    fn test_create_rejects_malformed_content() {
        let storage = MemoryRuleStorage::new();
        let err = create_rule("a: [1, 2\n", &storage).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Parse);
        assert!(list_rules(&storage).unwrap().is_empty());
    }

    #[test]
    fn test_update_is_last_write_wins_and_keeps_history() {
        let storage = MemoryRuleStorage::new();
        let rule = create_rule("Name: a\n", &storage).unwrap();

        update_rule(&rule.id, "Name: b\n", &storage).unwrap();
        let updated = update_rule(&rule.id, "Name: c\n", &storage).unwrap();

        assert_eq!(updated.revision, 3);
        assert_eq!(updated.json["Name"], "c");
        let history = rule_history(&rule.id, &storage).unwrap();
        let contents: Vec<_> = history.iter().map(|s| s.content.as_str()).collect();
        assert_eq!(contents, vec!["Name: a\n", "Name: b\n"]);
    }

    #[test]
    fn test_update_unknown_rule() {
        let storage = MemoryRuleStorage::new();
        let err = update_rule("missing", "Name: a\n", &storage).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::NotFound);
    }

    #[test]
    fn test_delete_then_get() {
        let storage = MemoryRuleStorage::new();
        let rule = create_rule("Name: a\n", &storage).unwrap();
        delete_rule(&rule.id, &storage).unwrap();
        let err = get_rule(&rule.id, &storage).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::NotFound);
    }
}
