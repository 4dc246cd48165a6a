//! Migrations embedded at compile time

pub struct Migration {
    pub id: &'static str,
    pub sql: &'static str,
}

/// All migrations in application order
pub fn get_migrations() -> Vec<Migration> {
    vec![
        Migration {
            id: "001_rules",
            sql: include_str!("../../migrations/001_rules.sql"),
        },
        Migration {
            id: "002_core_sequence",
            sql: include_str!("../../migrations/002_core_sequence.sql"),
        },
    ]
}
