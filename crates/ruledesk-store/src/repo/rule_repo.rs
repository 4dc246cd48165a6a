//! SQLite repository for rules and their history

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use chrono::{DateTime, TimeZone, Utc};
use ruledesk_core::errors::RuleError;
use ruledesk_core::model::{CoreId, Rule, RulePatch, RuleSnapshot, RuleSummary};
use rusqlite::{Connection, OptionalExtension, Row, Transaction};

/// SQLite repository for rules
pub struct RuleRepo;

fn millis(ts: &DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

fn from_millis(idx: usize, ms: i64) -> rusqlite::Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, ms))
}

fn core_number(idx: usize, value: Option<i64>) -> rusqlite::Result<Option<CoreId>> {
    value
        .map(|n| {
            u32::try_from(n)
                .ok()
                .and_then(|n| CoreId::from_number(n).ok())
                .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, n))
        })
        .transpose()
}

impl RuleRepo {
    /// Insert a new rule row
    pub fn insert_rule(conn: &Connection, rule: &Rule) -> Result<()> {
        conn.execute(
            "INSERT INTO rules (id, content, json, core_id, status, revision, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                rule.id,
                rule.content,
                rule.json,
                rule.core_id().map(|c| c.number()),
                rule.status(),
                rule.revision as i64,
                millis(&rule.created_at),
                millis(&rule.updated_at),
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    /// Load a rule with its full history
    pub fn get_rule(conn: &Connection, rule_id: &str) -> Result<Option<Rule>> {
        let rule = conn
            .query_row(
                "SELECT id, content, json, revision, created_at, updated_at
                 FROM rules WHERE id = ?1",
                [rule_id],
                |row| {
                    Ok(Rule {
                        id: row.get(0)?,
                        content: row.get(1)?,
                        json: row.get(2)?,
                        revision: row.get::<_, i64>(3)? as u64,
                        history: Vec::new(),
                        created_at: from_millis(4, row.get(4)?)?,
                        updated_at: from_millis(5, row.get(5)?)?,
                    })
                },
            )
            .optional()
            .map_err(from_rusqlite)?;

        match rule {
            Some(mut rule) => {
                rule.history = Self::list_history(conn, rule_id)?;
                Ok(Some(rule))
            }
            None => Ok(None),
        }
    }

    /// Snapshots for a rule, oldest first
    pub fn list_history(conn: &Connection, rule_id: &str) -> Result<Vec<RuleSnapshot>> {
        let mut stmt = conn
            .prepare(
                "SELECT revision, content, recorded_at FROM rule_history
                 WHERE rule_id = ?1 ORDER BY revision",
            )
            .map_err(from_rusqlite)?;
        let history = stmt
            .query_map([rule_id], |row| {
                Ok(RuleSnapshot {
                    revision: row.get::<_, i64>(0)? as u64,
                    content: row.get(1)?,
                    recorded_at: from_millis(2, row.get(2)?)?,
                })
            })
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(history)
    }

    /// Apply a patch inside `tx`: revision check, history append, row update.
    ///
    /// Returns the updated rule, or `NotFound`/`Conflict` errors.
    pub fn patch_rule_tx(tx: &Transaction, rule_id: &str, patch: RulePatch) -> Result<Rule> {
        let mut rule = Self::get_rule(tx, rule_id)?.ok_or_else(|| RuleError::RuleNotFound {
            rule_id: rule_id.to_string(),
        })?;

        if let Some(expected) = patch.expected_revision {
            if expected != rule.revision {
                return Err(RuleError::Conflict {
                    rule_id: rule_id.to_string(),
                    expected,
                    actual: rule.revision,
                }
                .into());
            }
        }

        let now = Utc::now();
        rule.apply_patch(patch, now);
        if let Some(snapshot) = rule.history.last() {
            tx.execute(
                "INSERT INTO rule_history (rule_id, revision, content, recorded_at)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    rule_id,
                    snapshot.revision as i64,
                    snapshot.content,
                    millis(&snapshot.recorded_at),
                ],
            )
            .map_err(from_rusqlite)?;
        }

        tx.execute(
            "UPDATE rules SET content = ?2, json = ?3, core_id = ?4, status = ?5,
                revision = ?6, updated_at = ?7
             WHERE id = ?1",
            rusqlite::params![
                rule_id,
                rule.content,
                rule.json,
                rule.core_id().map(|c| c.number()),
                rule.status(),
                rule.revision as i64,
                millis(&rule.updated_at),
            ],
        )
        .map_err(from_rusqlite)?;

        // re-read so timestamps carry the stored precision
        Self::get_rule(tx, rule_id)?.ok_or_else(|| {
            RuleError::RuleNotFound {
                rule_id: rule_id.to_string(),
            }
            .into()
        })
    }

    /// Delete a rule and its history; `false` if it did not exist
    pub fn delete_rule(conn: &Connection, rule_id: &str) -> Result<bool> {
        let deleted = conn
            .execute("DELETE FROM rules WHERE id = ?1", [rule_id])
            .map_err(from_rusqlite)?;
        Ok(deleted > 0)
    }

    /// Summaries in creation order
    pub fn list_rules(conn: &Connection) -> Result<Vec<RuleSummary>> {
        let mut stmt = conn
            .prepare(
                "SELECT id, core_id, status, revision, updated_at FROM rules
                 ORDER BY created_at, rowid",
            )
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([], summary_from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(rows)
    }

    /// Highest well-formed Core.Id stored in any rule
    pub fn max_core_id(conn: &Connection) -> Result<Option<CoreId>> {
        let max: Option<i64> = conn
            .query_row("SELECT MAX(core_id) FROM rules", [], |row| row.get(0))
            .map_err(from_rusqlite)?;
        core_number(0, max).map_err(from_rusqlite)
    }
}

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<RuleSummary> {
    Ok(RuleSummary {
        id: row.get(0)?,
        core_id: core_number(1, row.get(1)?)?,
        status: row.get(2)?,
        revision: row.get::<_, i64>(3)? as u64,
        updated_at: from_millis(4, row.get(4)?)?,
    })
}
