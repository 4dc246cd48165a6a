use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::core_meta::CoreId;

/// A persisted rule document
///
/// `id` is the storage key (UUID v7) and is unrelated to the `Core.Id`
/// stamped into the content on publish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,

    /// Rule text exactly as authored
    pub content: String,

    /// Value-only projection of `content`
    pub json: serde_json::Value,

    /// Incremented on every successful write, starting at 1
    pub revision: u64,

    /// Prior states, oldest first
    #[serde(default)]
    pub history: Vec<RuleSnapshot>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// State of a rule before a write replaced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSnapshot {
    pub revision: u64,
    pub content: String,
    pub recorded_at: DateTime<Utc>,
}

/// Listing row for a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSummary {
    pub id: String,
    pub core_id: Option<CoreId>,
    pub status: Option<String>,
    pub revision: u64,
    pub updated_at: DateTime<Utc>,
}

/// Replacement content for an existing rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulePatch {
    pub content: String,
    pub json: serde_json::Value,
    /// When set, the write fails with a conflict unless the stored revision
    /// still equals this value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_revision: Option<u64>,
}

impl RulePatch {
    pub fn new(content: impl Into<String>, json: serde_json::Value) -> Self {
        Self {
            content: content.into(),
            json,
            expected_revision: None,
        }
    }

    pub fn expecting(mut self, revision: u64) -> Self {
        self.expected_revision = Some(revision);
        self
    }
}

impl Rule {
    /// A first-revision rule with current timestamps
    pub fn new(id: String, content: String, json: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id,
            content,
            json,
            revision: 1,
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// `Core.Id` from the projection, if it is well-formed
    pub fn core_id(&self) -> Option<CoreId> {
        self.json
            .pointer("/Core/Id")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok())
    }

    pub fn status(&self) -> Option<&str> {
        self.json.pointer("/Core/Status").and_then(|v| v.as_str())
    }

    pub fn summary(&self) -> RuleSummary {
        RuleSummary {
            id: self.id.clone(),
            core_id: self.core_id(),
            status: self.status().map(str::to_string),
            revision: self.revision,
            updated_at: self.updated_at,
        }
    }

    /// Replace the content, recording the current state in history.
    ///
    /// Revision checks are the caller's job; this only performs the write.
    pub fn apply_patch(&mut self, patch: RulePatch, now: DateTime<Utc>) {
        self.history.push(RuleSnapshot {
            revision: self.revision,
            content: std::mem::take(&mut self.content),
            recorded_at: now,
        });
        self.content = patch.content;
        self.json = patch.json;
        self.revision += 1;
        self.updated_at = now;
    }
}
