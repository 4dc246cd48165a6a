//! RuleDesk Store - SQLite persistence for rules
//!
//! Provides:
//! - Connection setup (WAL, busy timeout) and embedded, checksummed migrations
//! - The rule repository with append-only history
//! - The persisted Core.Id sequence
//! - `SqliteRuleStorage`, the `RuleStorage`/`IdentifierAllocator` implementation

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;
pub mod sequence;
pub mod storage;

pub use errors::Result;
pub use storage::SqliteRuleStorage;
