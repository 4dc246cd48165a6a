//! In-process rule storage and identifier sequence

use crate::allocator::IdentifierAllocator;
use crate::errors::{ExError, ExErrorKind, ExResult, RuleError};
use crate::model::{CoreId, Rule, RulePatch, RuleSummary};
use crate::storage::RuleStorage;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Default)]
struct State {
    /// Keyed by UUID v7, so iteration follows creation order
    rules: BTreeMap<String, Rule>,
    /// Last identifier handed out; `None` until the first allocation
    sequence: Option<CoreId>,
}

impl State {
    fn max_identifier(&self) -> Option<CoreId> {
        self.rules.values().filter_map(Rule::core_id).max()
    }
}

/// Rule storage and allocator backed by a single mutex
///
/// The allocator shares the rules' lock, so the sequence is seeded from the
/// stored maximum and advanced within one critical section.
#[derive(Default)]
pub struct MemoryRuleStorage {
    state: Mutex<State>,
}

impl MemoryRuleStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-loaded with `rules`
    pub fn with_rules(rules: impl IntoIterator<Item = Rule>) -> Self {
        let state = State {
            rules: rules.into_iter().map(|r| (r.id.clone(), r)).collect(),
            sequence: None,
        };
        Self {
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> ExResult<MutexGuard<'_, State>> {
        self.state.lock().map_err(|_| {
            ExError::new(ExErrorKind::Internal)
                .with_op("memory_storage")
                .with_message("storage lock poisoned")
        })
    }
}

fn not_found(id: &str) -> ExError {
    RuleError::RuleNotFound {
        rule_id: id.to_string(),
    }
    .into()
}

impl RuleStorage for MemoryRuleStorage {
    fn get_rule(&self, id: &str) -> ExResult<Rule> {
        self.lock()?.rules.get(id).cloned().ok_or_else(|| not_found(id))
    }

    fn patch_rule(&self, id: &str, patch: RulePatch) -> ExResult<Rule> {
        let mut state = self.lock()?;
        let rule = state.rules.get_mut(id).ok_or_else(|| not_found(id))?;
        if let Some(expected) = patch.expected_revision {
            if expected != rule.revision {
                return Err(RuleError::Conflict {
                    rule_id: id.to_string(),
                    expected,
                    actual: rule.revision,
                }
                .into());
            }
        }
        rule.apply_patch(patch, Utc::now());
        Ok(rule.clone())
    }

    fn current_max_identifier(&self) -> ExResult<Option<CoreId>> {
        Ok(self.lock()?.max_identifier())
    }

    fn create_rule(&self, content: String, json: serde_json::Value) -> ExResult<Rule> {
        let rule = Rule::new(Uuid::now_v7().to_string(), content, json);
        self.lock()?.rules.insert(rule.id.clone(), rule.clone());
        Ok(rule)
    }

    fn delete_rule(&self, id: &str) -> ExResult<()> {
        self.lock()?
            .rules
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }

    fn list_rules(&self) -> ExResult<Vec<RuleSummary>> {
        Ok(self.lock()?.rules.values().map(Rule::summary).collect())
    }
}

impl IdentifierAllocator for MemoryRuleStorage {
    fn allocate(&self) -> ExResult<CoreId> {
        let mut state = self.lock()?;
        let current = state.sequence.max(state.max_identifier());
        let next = CoreId::next_after(current)?;
        state.sequence = Some(next);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_crud_cycle() {
        let storage = MemoryRuleStorage::new();
        let created = storage
            .create_rule("Name: x\n".into(), json!({"Name": "x"}))
            .unwrap();
        assert_eq!(storage.get_rule(&created.id).unwrap(), created);

        let patched = storage
            .patch_rule(&created.id, RulePatch::new("Name: y\n", json!({"Name": "y"})))
            .unwrap();
        assert_eq!(patched.revision, 2);
        assert_eq!(patched.history[0].content, "Name: x\n");

        assert_eq!(storage.list_rules().unwrap().len(), 1);
        storage.delete_rule(&created.id).unwrap();
        let err = storage.get_rule(&created.id).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::NotFound);
    }

    #[test]
    fn test_patch_with_stale_revision_conflicts() {
        let storage = MemoryRuleStorage::new();
        let rule = storage.create_rule("a: 1\n".into(), json!({"a": 1})).unwrap();
        storage
            .patch_rule(&rule.id, RulePatch::new("a: 2\n", json!({"a": 2})))
            .unwrap();

        let err = storage
            .patch_rule(&rule.id, RulePatch::new("a: 3\n", json!({"a": 3})).expecting(1))
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Conflict);
        assert_eq!(storage.get_rule(&rule.id).unwrap().content, "a: 2\n");
    }

    #[test]
    fn test_allocation_seeds_from_stored_maximum() {
        let storage = MemoryRuleStorage::new();
        storage
            .create_rule(String::new(), json!({"Core": {"Id": "CORE-000041"}}))
            .unwrap();
        assert_eq!(storage.allocate().unwrap().to_string(), "CORE-000042");
        assert_eq!(storage.allocate().unwrap().to_string(), "CORE-000043");
    }

    #[test]
    fn test_allocation_never_reuses_after_delete() {
        let storage = MemoryRuleStorage::new();
        let rule = storage
            .create_rule(String::new(), json!({"Core": {"Id": "CORE-000005"}}))
            .unwrap();
        assert_eq!(storage.allocate().unwrap().number(), 6);
        storage.delete_rule(&rule.id).unwrap();
        assert_eq!(storage.allocate().unwrap().number(), 7);
    }

    #[test]
    fn test_concurrent_allocation_is_gapless() {
        let storage = Arc::new(MemoryRuleStorage::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let storage = Arc::clone(&storage);
                thread::spawn(move || storage.allocate().unwrap().number())
            })
            .collect();
        let mut numbers: Vec<u32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        numbers.sort_unstable();
        assert_eq!(numbers, (1..=16).collect::<Vec<_>>());
    }
}
