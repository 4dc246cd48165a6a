//! Engine command dispatch
//!
//! Single entry point for every state-changing rule operation.

#![allow(clippy::result_large_err)]

use crate::commands::publish::{publish_rule, PublishOutcome};
use crate::commands::rule;
use ruledesk_core::allocator::IdentifierAllocator;
use ruledesk_core::errors::ExResult as Result;
use ruledesk_core::model::Rule;
use ruledesk_core::storage::RuleStorage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    CreateRule { content: String },
    UpdateRule { rule_id: String, content: String },
    DeleteRule { rule_id: String },
    PublishRule { rule_id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommandResult {
    Created(Rule),
    Updated(Rule),
    Deleted { rule_id: String },
    Published(PublishOutcome),
}

impl EngineCommandResult {
    /// The rule as it now stands, if the command left one behind
    pub fn rule(&self) -> Option<&Rule> {
        match self {
            EngineCommandResult::Created(r) | EngineCommandResult::Updated(r) => Some(r),
            EngineCommandResult::Published(outcome) => Some(&outcome.rule),
            EngineCommandResult::Deleted { .. } => None,
        }
    }
}

/// # Errors
///
/// Whatever the dispatched command returns.
pub fn apply_engine_command(
    cmd: EngineCommand,
    storage: &dyn RuleStorage,
    allocator: &dyn IdentifierAllocator,
) -> Result<EngineCommandResult> {
    match cmd {
        EngineCommand::CreateRule { content } => {
            rule::create_rule(&content, storage).map(EngineCommandResult::Created)
        }
        EngineCommand::UpdateRule { rule_id, content } => {
            rule::update_rule(&rule_id, &content, storage).map(EngineCommandResult::Updated)
        }
        EngineCommand::DeleteRule { rule_id } => {
            rule::delete_rule(&rule_id, storage)?;
            Ok(EngineCommandResult::Deleted { rule_id })
        }
        EngineCommand::PublishRule { rule_id } => {
            publish_rule(&rule_id, storage, allocator).map(EngineCommandResult::Published)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruledesk_core::storage::MemoryRuleStorage;

    #[test]
    fn test_command_sequence() {
        let storage = MemoryRuleStorage::new();

        let created = apply_engine_command(
            EngineCommand::CreateRule {
                content: "Name: x\n".to_string(),
            },
            &storage,
            &storage,
        )
        .unwrap();
        let rule_id = created.rule().unwrap().id.clone();

        let published = apply_engine_command(
            EngineCommand::PublishRule {
                rule_id: rule_id.clone(),
            },
            &storage,
            &storage,
        )
        .unwrap();
        let EngineCommandResult::Published(outcome) = published else {
            panic!("expected a publish result")
        };
        assert_eq!(outcome.core_id.to_string(), "CORE-000001");
        assert_eq!(outcome.rule.status(), Some("Published"));

        let deleted = apply_engine_command(
            EngineCommand::DeleteRule {
                rule_id: rule_id.clone(),
            },
            &storage,
            &storage,
        )
        .unwrap();
        assert!(deleted.rule().is_none());
        assert_eq!(deleted, EngineCommandResult::Deleted { rule_id });
    }
}
