pub mod core_meta;
pub mod rule;

pub use core_meta::{CoreId, CoreIdState, CoreStatus, ID_PATH, STATUS_PATH};
pub use rule::{Rule, RulePatch, RuleSnapshot, RuleSummary};
