//! RuleDesk Engine - Orchestration layer
//!
//! Coordinates the document model, identifier allocation and rule storage
//! for the publish workflow and plain rule CRUD.

pub mod commands;

pub use commands::engine_command::{apply_engine_command, EngineCommand, EngineCommandResult};
pub use commands::engine_query::{apply_engine_query, EngineQuery, EngineQueryResult};
pub use commands::publish::{publish_rule, PublishOutcome};
