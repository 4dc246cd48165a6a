//! Repository layer mapping rule models to SQL rows

pub mod rule_repo;

pub use rule_repo::RuleRepo;
