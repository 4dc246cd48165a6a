//! Rule persistence contract
//!
//! The storage provider owns persisted rules, including their history.
//! `ruledesk-store` provides the SQLite implementation; [`memory`] keeps
//! everything in process for tests and embedding.

pub mod memory;

pub use memory::MemoryRuleStorage;

use crate::errors::ExResult;
use crate::model::{CoreId, Rule, RulePatch, RuleSummary};
use std::sync::Arc;

pub trait RuleStorage: Send + Sync {
    /// # Errors
    ///
    /// `ExErrorKind::NotFound` for an unknown id.
    fn get_rule(&self, id: &str) -> ExResult<Rule>;

    /// Replace a rule's content, appending its previous state to history.
    ///
    /// # Errors
    ///
    /// - `ExErrorKind::NotFound` for an unknown id
    /// - `ExErrorKind::Conflict` when `patch.expected_revision` is set and
    ///   no longer matches
    /// - `ExErrorKind::Persistence` when the write fails
    fn patch_rule(&self, id: &str, patch: RulePatch) -> ExResult<Rule>;

    /// Highest well-formed `Core.Id` in any stored rule
    ///
    /// # Errors
    ///
    /// `ExErrorKind::Persistence` when the query fails.
    fn current_max_identifier(&self) -> ExResult<Option<CoreId>>;

    /// # Errors
    ///
    /// `ExErrorKind::Persistence` when the write fails.
    fn create_rule(&self, content: String, json: serde_json::Value) -> ExResult<Rule>;

    /// # Errors
    ///
    /// `ExErrorKind::NotFound` for an unknown id.
    fn delete_rule(&self, id: &str) -> ExResult<()>;

    /// Summaries ordered by creation
    ///
    /// # Errors
    ///
    /// `ExErrorKind::Persistence` when the query fails.
    fn list_rules(&self) -> ExResult<Vec<RuleSummary>>;
}

impl<T: RuleStorage + ?Sized> RuleStorage for Arc<T> {
    fn get_rule(&self, id: &str) -> ExResult<Rule> {
        (**self).get_rule(id)
    }

    fn patch_rule(&self, id: &str, patch: RulePatch) -> ExResult<Rule> {
        (**self).patch_rule(id, patch)
    }

    fn current_max_identifier(&self) -> ExResult<Option<CoreId>> {
        (**self).current_max_identifier()
    }

    fn create_rule(&self, content: String, json: serde_json::Value) -> ExResult<Rule> {
        (**self).create_rule(content, json)
    }

    fn delete_rule(&self, id: &str) -> ExResult<()> {
        (**self).delete_rule(id)
    }

    fn list_rules(&self) -> ExResult<Vec<RuleSummary>> {
        (**self).list_rules()
    }
}
