//! RuleDesk Core - rule documents, identifiers and the editing lifecycle
//!
//! - Formatting-preserving YAML documents with path-based edits
//! - `Rule` and `Core` metadata models, including `CORE-NNNNNN` identifiers
//! - Storage and allocator contracts plus an in-memory implementation
//! - The client edit state machine and its action gates
//! - Structured errors and the logging facility shared by every crate

pub mod allocator;
pub mod document;
pub mod errors;
pub mod lifecycle;
pub mod logging_facility;
pub mod model;
pub mod storage;

pub use allocator::IdentifierAllocator;
pub use document::{Document, Node, NodeValue};
pub use errors::{ExError, ExErrorKind, ExResult, Result, RuleError};
pub use model::{CoreId, CoreIdState, CoreStatus, Rule, RulePatch, RuleSnapshot, RuleSummary};
pub use storage::{MemoryRuleStorage, RuleStorage};
