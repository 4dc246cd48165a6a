//! Read-only engine queries

#![allow(clippy::result_large_err)]

use crate::commands::rule;
use ruledesk_core::errors::ExResult as Result;
use ruledesk_core::model::{Rule, RuleSnapshot, RuleSummary};
use ruledesk_core::storage::RuleStorage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineQuery {
    GetRule { rule_id: String },
    ListRules,
    RuleHistory { rule_id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineQueryResult {
    Rule(Rule),
    Rules(Vec<RuleSummary>),
    History(Vec<RuleSnapshot>),
}

/// # Errors
///
/// `ExErrorKind::NotFound` for unknown ids, storage failures otherwise.
pub fn apply_engine_query(query: EngineQuery, storage: &dyn RuleStorage) -> Result<EngineQueryResult> {
    match query {
        EngineQuery::GetRule { rule_id } => rule::get_rule(&rule_id, storage).map(EngineQueryResult::Rule),
        EngineQuery::ListRules => rule::list_rules(storage).map(EngineQueryResult::Rules),
        EngineQuery::RuleHistory { rule_id } => {
            rule::rule_history(&rule_id, storage).map(EngineQueryResult::History)
        }
    }
}
