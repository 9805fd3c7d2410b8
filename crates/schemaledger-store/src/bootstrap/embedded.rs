//! Embedded bootstrap SQL
//!
//! The store's own tables, embedded at compile time using include_str!

/// Bootstrap migration metadata
pub struct BootstrapMigration {
    pub id: &'static str,
    pub sql: &'static str,
}

/// Get all embedded bootstrap migrations in order
pub fn get_migrations() -> Vec<BootstrapMigration> {
    vec![
        BootstrapMigration {
            id: "001_schema_ledger",
            sql: include_str!("../../migrations/001_schema_ledger.sql"),
        },
        BootstrapMigration {
            id: "002_job_queue",
            sql: include_str!("../../migrations/002_job_queue.sql"),
        },
    ]
}
