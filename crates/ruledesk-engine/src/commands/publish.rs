//! Publish orchestration.
//!
//! ## Pipeline (in order):
//! 1. Fetch the rule (`NotFound` stops here)
//! 2. Parse its content (`Parse` stops here, nothing written)
//! 3. Check the `Core` section can hold metadata, creating it if missing
//! 4. Keep a well-formed `Core.Id`; otherwise allocate one
//! 5. Set `Core.Status` to `Published`
//! 6. Serialize and project to JSON
//! 7. Persist with the revision read in step 1 (`Conflict` if it moved)
//!
//! Only step 7 writes the rule. An identifier allocated in step 4 stays
//! spent if step 7 fails.

#![allow(clippy::result_large_err)]

use ruledesk_core::allocator::IdentifierAllocator;
use ruledesk_core::document::{Document, Node, NodeValue};
use ruledesk_core::errors::{ExResult as Result, RuleError};
use ruledesk_core::model::core_meta::CORE_SECTION;
use ruledesk_core::model::{CoreId, CoreIdState, CoreStatus, Rule, RulePatch, ID_PATH, STATUS_PATH};
use ruledesk_core::storage::RuleStorage;
use serde::Serialize;
use std::time::Instant;

/// Result of a successful publish
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishOutcome {
    pub rule: Rule,
    pub core_id: CoreId,
    /// `false` when the rule already carried a well-formed `Core.Id`
    pub allocated: bool,
}

/// Document after steps 2-6, ready to persist
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPublish {
    pub content: String,
    pub json: serde_json::Value,
    pub core_id: CoreId,
    pub allocated: bool,
}

/// Publish a rule: ensure its `Core.Id`, mark it `Published`, persist.
///
/// ## Errors
///
/// - `ExErrorKind::NotFound`: unknown rule
/// - `ExErrorKind::Parse`: content is not well-formed
/// - `ExErrorKind::InvalidInput`: `Core` (or the document root) is not a mapping
/// - `ExErrorKind::Allocation`: no identifier could be allocated
/// - `ExErrorKind::Conflict`: the rule changed after it was fetched
/// - `ExErrorKind::Persistence`: the write failed
pub fn publish_rule(
    rule_id: &str,
    storage: &dyn RuleStorage,
    allocator: &dyn IdentifierAllocator,
) -> Result<PublishOutcome> {
    let start = Instant::now();
    ruledesk_core::log_op_start!("publish_rule", rule = rule_id);

    let result = publish_rule_impl(rule_id, storage, allocator);
    match &result {
        Ok(outcome) => ruledesk_core::log_op_end!(
            "publish_rule",
            start,
            rule = rule_id,
            core_id = %outcome.core_id,
            allocated = outcome.allocated,
            revision = outcome.rule.revision
        ),
        Err(e) => ruledesk_core::log_op_error!("publish_rule", e.clone(), start, rule = rule_id),
    }
    result
}

fn publish_rule_impl(
    rule_id: &str,
    storage: &dyn RuleStorage,
    allocator: &dyn IdentifierAllocator,
) -> Result<PublishOutcome> {
    let fetched = storage.get_rule(rule_id)?;

    let prepared = prepare_publish(&fetched.content, allocator)
        .map_err(|e| e.with_entity_id(rule_id))?;

    let patch = RulePatch::new(prepared.content, prepared.json).expecting(fetched.revision);
    let rule = storage.patch_rule(rule_id, patch)?;

    Ok(PublishOutcome {
        rule,
        core_id: prepared.core_id,
        allocated: prepared.allocated,
    })
}

/// Steps 2-6 against rule text. Allocates only after every check passed.
///
/// ## Errors
///
/// Parse, InvalidInput and Allocation kinds as for [`publish_rule`].
pub fn prepare_publish(
    content: &str,
    allocator: &dyn IdentifierAllocator,
) -> Result<PreparedPublish> {
    let doc = ensure_core_section(Document::parse(content)?)?;

    let (doc, core_id, allocated) = match CoreIdState::classify(&doc) {
        CoreIdState::Valid(id) => (doc, id, false),
        state => {
            if let CoreIdState::Invalid(raw) = &state {
                tracing::debug!(invalid_core_id = %raw, "replacing malformed Core.Id");
            }
            let id = allocator.allocate()?;
            let doc = doc.apply(&ID_PATH, NodeValue::string(id.to_string()))?;
            (doc, id, true)
        }
    };

    let doc = doc.apply(
        &STATUS_PATH,
        NodeValue::string(CoreStatus::Published.as_str()),
    )?;

    Ok(PreparedPublish {
        content: doc.to_string(),
        json: doc.to_json()?,
        core_id,
        allocated,
    })
}

fn ensure_core_section(mut doc: Document) -> std::result::Result<Document, RuleError> {
    if doc.expand(&[]).is_err() {
        return Err(RuleError::InvalidCoreSection {
            reason: "rule document is not a mapping".to_string(),
        });
    }
    match doc.get(&[CORE_SECTION]) {
        None => doc.set(&[CORE_SECTION], NodeValue::EmptyMapping)?,
        Some(Node::Mapping(_)) => {}
        Some(Node::Scalar(s)) if s.is_null() => {}
        Some(Node::Scalar(s)) => {
            return Err(RuleError::InvalidCoreSection {
                reason: format!("Core is a scalar ({})", s.raw()),
            })
        }
        // flow style or an alias of a mapping
        Some(Node::Other(_)) => {
            if doc.expand(&[CORE_SECTION]).is_err() {
                return Err(RuleError::InvalidCoreSection {
                    reason: "Core is not a mapping".to_string(),
                });
            }
        }
    }
    Ok(doc)
}
