//! Persisted Core.Id sequence
//!
//! Allocation runs in a `BEGIN IMMEDIATE` transaction, which takes the
//! database write lock up front. Concurrent allocators on other connections
//! or in other processes wait (up to the busy timeout) instead of reading a
//! stale value, so each transaction sees the previous one's commit.

#![allow(clippy::result_large_err)]

use crate::errors::{allocation_error, Result};
use crate::repo::RuleRepo;
use ruledesk_core::errors::{ExError, ExErrorKind};
use ruledesk_core::model::CoreId;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior};

/// Row name of the Core.Id sequence
pub const CORE_SEQUENCE: &str = "core_id";

/// Allocate the next Core.Id.
///
/// The sequence row is seeded from the highest stored `Core.Id` on first
/// use. Later allocations take the larger of the row and the stored
/// maximum, so identifiers written by hand are never handed out again.
///
/// # Errors
///
/// `ExErrorKind::Allocation` if the transaction cannot start or commit, or
/// the sequence is exhausted. Nothing is committed on error.
pub fn allocate_next(conn: &mut Connection) -> Result<CoreId> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(allocation_error)?;

    let last: Option<i64> = tx
        .query_row(
            "SELECT last_value FROM core_sequence WHERE name = ?1",
            [CORE_SEQUENCE],
            |row| row.get(0),
        )
        .optional()
        .map_err(allocation_error)?;
    let last = last
        .map(|n| {
            u32::try_from(n)
                .ok()
                .and_then(|n| CoreId::from_number(n).ok())
                .ok_or_else(|| {
                    ExError::new(ExErrorKind::Allocation)
                        .with_op("allocate_core_id")
                        .with_message(format!("corrupt sequence value {}", n))
                })
        })
        .transpose()?;

    let stored_max = RuleRepo::max_core_id(&tx).map_err(|e| {
        ExError::new(ExErrorKind::Allocation)
            .with_op("allocate_core_id")
            .with_message(e.message().to_string())
    })?;

    let next = CoreId::next_after(last.max(stored_max)).map_err(ExError::from)?;

    tx.execute(
        "INSERT INTO core_sequence (name, last_value) VALUES (?1, ?2)
         ON CONFLICT(name) DO UPDATE SET last_value = excluded.last_value",
        rusqlite::params![CORE_SEQUENCE, next.number()],
    )
    .map_err(allocation_error)?;
    tx.commit().map_err(allocation_error)?;

    tracing::debug!(core_id = %next, "allocated core id");
    Ok(next)
}
