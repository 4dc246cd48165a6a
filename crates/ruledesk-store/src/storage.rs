//! `RuleStorage` and `IdentifierAllocator` over one SQLite connection

#![allow(clippy::result_large_err)]

use crate::db;
use crate::errors::{from_rusqlite, Result};
use crate::repo::RuleRepo;
use crate::sequence;
use ruledesk_core::allocator::IdentifierAllocator;
use ruledesk_core::errors::{ExError, ExErrorKind, RuleError};
use ruledesk_core::model::{CoreId, Rule, RulePatch, RuleSummary};
use ruledesk_core::storage::RuleStorage;
use rusqlite::{Connection, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

/// SQLite-backed rule storage
///
/// Each instance owns one connection. Several instances (in this process or
/// others) may share a database file; writes and allocations serialize on
/// SQLite's write lock.
pub struct SqliteRuleStorage {
    conn: Mutex<Connection>,
}

impl SqliteRuleStorage {
    /// Open (and migrate) the database at `path`
    pub fn open<P: AsRef<Path>>(path: P, busy_timeout: Duration) -> Result<Self> {
        Ok(Self::from_connection(db::open_store(path, busy_timeout)?))
    }

    /// Fresh migrated in-memory database
    pub fn in_memory() -> Result<Self> {
        let mut conn = db::open_in_memory()?;
        db::configure(&conn, db::DEFAULT_BUSY_TIMEOUT)?;
        crate::migrations::apply_migrations(&mut conn)?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap an already migrated connection
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| {
            ExError::new(ExErrorKind::Internal)
                .with_op("sqlite_storage")
                .with_message("connection lock poisoned")
        })
    }
}

fn not_found(id: &str) -> ExError {
    RuleError::RuleNotFound {
        rule_id: id.to_string(),
    }
    .into()
}

impl RuleStorage for SqliteRuleStorage {
    fn get_rule(&self, id: &str) -> Result<Rule> {
        RuleRepo::get_rule(&*self.conn()?, id)?.ok_or_else(|| not_found(id))
    }

    fn patch_rule(&self, id: &str, patch: RulePatch) -> Result<Rule> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(from_rusqlite)?;
        let rule = RuleRepo::patch_rule_tx(&tx, id, patch)?;
        tx.commit().map_err(from_rusqlite)?;
        tracing::debug!(rule_id = %id, revision = rule.revision, "patched rule");
        Ok(rule)
    }

    fn current_max_identifier(&self) -> Result<Option<CoreId>> {
        RuleRepo::max_core_id(&*self.conn()?)
    }

    fn create_rule(&self, content: String, json: serde_json::Value) -> Result<Rule> {
        let conn = self.conn()?;
        let rule = Rule::new(Uuid::now_v7().to_string(), content, json);
        RuleRepo::insert_rule(&conn, &rule)?;
        RuleRepo::get_rule(&conn, &rule.id)?.ok_or_else(|| not_found(&rule.id))
    }

    fn delete_rule(&self, id: &str) -> Result<()> {
        if RuleRepo::delete_rule(&*self.conn()?, id)? {
            Ok(())
        } else {
            Err(not_found(id))
        }
    }

    fn list_rules(&self) -> Result<Vec<RuleSummary>> {
        RuleRepo::list_rules(&*self.conn()?)
    }
}

impl IdentifierAllocator for SqliteRuleStorage {
    fn allocate(&self) -> Result<CoreId> {
        sequence::allocate_next(&mut *self.conn()?)
    }
}
